// ABOUTME: Help and documentation system for the Lisp interpreter
// Provides first-class documentation for built-in and user-defined functions

use std::cell::RefCell;
use std::collections::HashMap;

/// A help entry for a function
#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub name: String,
    pub signature: String,
    pub description: String,
    pub examples: Vec<String>,
    pub related: Vec<String>,
    pub category: String,
}

/// Macro for defining help entries with less boilerplate
/// Usage: help_entry!("name", "category", "signature", "description", ["ex1", "ex2"], ["related1"])
macro_rules! help_entry {
    (
        $name:literal,
        $category:literal,
        $signature:literal,
        $description:literal,
        [$($example:literal),* $(,)?],
        [$($related:literal),* $(,)?]
    ) => {
        register_help(HelpEntry {
            name: $name.to_string(),
            category: $category.to_string(),
            signature: $signature.to_string(),
            description: $description.trim().to_string(),
            examples: vec![$($example.to_string()),*],
            related: vec![$($related.to_string()),*],
        });
    };
}

/// Registry for all function documentation
pub struct HelpRegistry {
    entries: HashMap<String, HelpEntry>,
}

impl HelpRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a help entry
    pub fn register(&mut self, entry: HelpEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Get a help entry by name
    pub fn get(&self, name: &str) -> Option<HelpEntry> {
        self.entries.get(name).cloned()
    }

    /// Get all entries organized by category
    pub fn by_category(&self) -> HashMap<String, Vec<HelpEntry>> {
        let mut by_cat: HashMap<String, Vec<HelpEntry>> = HashMap::new();
        for entry in self.entries.values() {
            by_cat
                .entry(entry.category.clone())
                .or_default()
                .push(entry.clone());
        }
        // Sort each category
        for entries in by_cat.values_mut() {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }
        by_cat
    }

    /// Get all function names
    #[allow(dead_code)]
    pub fn all_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for HelpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Thread-local help registry
thread_local! {
    static HELP_REGISTRY: RefCell<HelpRegistry> = RefCell::new(HelpRegistry::new());
}

/// Register a help entry in the global registry
pub fn register_help(entry: HelpEntry) {
    HELP_REGISTRY.with(|reg| {
        reg.borrow_mut().register(entry);
    });
}

/// Get a help entry by name
pub fn get_help(name: &str) -> Option<HelpEntry> {
    HELP_REGISTRY.with(|reg| reg.borrow().get(name))
}

/// Get all entries organized by category
pub fn all_by_category() -> HashMap<String, Vec<HelpEntry>> {
    HELP_REGISTRY.with(|reg| reg.borrow().by_category())
}

/// Get all function names
#[allow(dead_code)]
pub fn all_names() -> Vec<String> {
    HELP_REGISTRY.with(|reg| reg.borrow().all_names())
}

/// Format a single help entry for display with syntax highlighting
pub fn format_help_entry(entry: &HelpEntry) -> String {
    let mut output = String::new();

    // Header with name and category
    output.push_str(&format!("{} - {}\n", entry.name, entry.category));
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    // Signature - split multi-line signatures nicely
    output.push_str("Signature:\n");
    for sig_line in entry.signature.lines() {
        output.push_str(&format!("  {}\n", sig_line));
    }
    output.push('\n');

    // Description
    output.push_str("Description:\n");
    for line in entry.description.lines() {
        output.push_str(&format!("  {}\n", line));
    }
    output.push('\n');

    // Examples with better formatting
    if !entry.examples.is_empty() {
        output.push_str("Examples:\n");
        for example in &entry.examples {
            output.push_str("  ");
            output.push_str(example);
            output.push('\n');
        }
        output.push('\n');
    }

    // Related functions
    if !entry.related.is_empty() {
        output.push_str("Related:\n");
        output.push_str(&format!("  {}\n", entry.related.join(", ")));
        output.push('\n');
    }

    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    output
}

/// Format quick reference showing all functions
pub fn format_quick_reference() -> String {
    let mut output = String::new();

    let by_cat = all_by_category();
    let total = by_cat.values().map(|v| v.len()).sum::<usize>();

    output.push_str(&format!("Available Functions ({} total)\n", total));
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Define category display order
    let categories = vec![
        "Special Forms",
        "Arithmetic",
        "Comparison",
        "Predicates",
        "Sequences",
        "Hash Maps",
        "Atoms",
        "Metadata",
        "Exceptions",
        "I/O",
        "Constructors",
    ];

    for category in categories {
        if let Some(entries) = by_cat.get(category) {
            let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
            output.push_str(&format!("{} ({})\n", category, names.len()));
            output.push_str(&format!("  {}\n\n", names.join(", ")));
        }
    }

    output.push_str("Type (help 'function-name) for detailed help.\n");
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    output
}

/// Documents the special forms handled directly by the evaluator, which
/// (unlike every other builtin) have no `#[builtin]`-generated entry of
/// their own since they never become `Value::BuiltIn` values.
pub fn populate_special_form_help() {
    help_entry!("def!", "Special Forms", "(def! symbol value)",
        "Binds a symbol to a value in the current environment and returns the value.",
        ["(def! x 42) => 42", "(def! f (fn* (x) (* x x)))"], ["let*", "fn*"]);
    help_entry!("let*", "Special Forms", "(let* (sym1 val1 sym2 val2 ...) body)",
        "Creates a new scope with sequential bindings, then evaluates body in it.",
        ["(let* (x 3 y (+ x 1)) (* x y)) => 12"], ["def!", "do"]);
    help_entry!("do", "Special Forms", "(do expr1 expr2 ...)",
        "Evaluates each expression in order and returns the value of the last.",
        ["(do (def! x 1) (+ x 1)) => 2"], ["if", "let*"]);
    help_entry!("if", "Special Forms", "(if cond then) or (if cond then else)",
        "Evaluates then if cond is truthy, else otherwise. nil and false are the only falsy values.\nA two-form if with a falsy condition and no else returns nil.",
        ["(if (> 2 1) :yes :no) => :yes", "(if false 1) => nil"], ["do", "cond"]);
    help_entry!("fn*", "Special Forms", "(fn* (param1 param2 ... & rest) body)",
        "Creates a closure over the current environment. A literal '&' marks the following\nparameter as variadic, bound to the remaining arguments as a list.",
        ["((fn* (a b) (+ a b)) 1 2) => 3", "((fn* (a & rest) rest) 1 2 3) => (2 3)"],
        ["def!", "defmacro!"]);
    help_entry!("quote", "Special Forms", "(quote form) or 'form",
        "Returns form unevaluated.",
        ["(quote (+ 1 2)) => (+ 1 2)", "'x => x"], ["quasiquote"]);
    help_entry!("quasiquote", "Special Forms", "(quasiquote form) or `form",
        "Like quote, but unquote (~) evaluates a sub-form and splice-unquote (~@) splices a\nsequence's elements into the surrounding form.",
        ["`(1 ~(+ 1 1) 3) => (1 2 3)", "`(0 ~@(list 1 2)) => (0 1 2)"],
        ["quote", "defmacro!"]);
    help_entry!("defmacro!", "Special Forms", "(defmacro! symbol (fn* (params) body))",
        "Like def!, but marks the bound function as a macro: its call sites are expanded\n(with arguments unevaluated) before the result is evaluated.",
        ["(defmacro! unless (fn* (pred a b) `(if ~pred ~b ~a)))"], ["macroexpand", "fn*"]);
    help_entry!("macroexpand", "Special Forms", "(macroexpand form)",
        "Expands form as if it were a macro call, without evaluating the result.",
        ["(macroexpand (unless false 7 8)) => (if false 8 7)"], ["defmacro!"]);
    help_entry!("try*", "Special Forms", "(try* A (catch* e B))",
        "Evaluates A; if it raises (via throw or an interpreter error), binds the raised\nvalue to e and evaluates B instead.",
        ["(try* (throw \"oops\") (catch* e e)) => \"oops\""], ["throw"]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_registry_register_and_get() {
        let mut registry = HelpRegistry::new();
        let entry = HelpEntry {
            name: "test-fn".to_string(),
            signature: "(test-fn x)".to_string(),
            description: "Test function".to_string(),
            examples: vec![],
            related: vec![],
            category: "Test".to_string(),
        };

        registry.register(entry.clone());
        assert_eq!(registry.get("test-fn").unwrap().name, "test-fn");
    }

    #[test]
    fn test_help_registry_by_category() {
        let mut registry = HelpRegistry::new();
        registry.register(HelpEntry {
            name: "fn1".to_string(),
            signature: "".to_string(),
            description: "".to_string(),
            examples: vec![],
            related: vec![],
            category: "Arithmetic".to_string(),
        });
        registry.register(HelpEntry {
            name: "fn2".to_string(),
            signature: "".to_string(),
            description: "".to_string(),
            examples: vec![],
            related: vec![],
            category: "Arithmetic".to_string(),
        });

        let by_cat = registry.by_category();
        assert_eq!(by_cat["Arithmetic"].len(), 2);
    }

    #[test]
    fn test_format_help_entry() {
        let entry = HelpEntry {
            name: "test".to_string(),
            signature: "(test x)".to_string(),
            description: "A test function".to_string(),
            examples: vec!["(test 1)".to_string()],
            related: vec!["other".to_string()],
            category: "Test".to_string(),
        };

        let formatted = format_help_entry(&entry);
        assert!(formatted.contains("test - Test"));
        assert!(formatted.contains("A test function"));
        assert!(formatted.contains("(test 1)"));
    }

    #[test]
    fn test_populate_special_form_help() {
        populate_special_form_help();
        assert!(get_help("if").is_some());
        assert!(get_help("defmacro!").is_some());
        assert!(get_help("try*").is_some());
    }
}
