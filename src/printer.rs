//! Renders values back to text. Pure: no environment, no side effects.

use crate::value::Value;

/// `print(value, readable)`, per SPEC_FULL.md §4.2.
///
/// When `readable` is true the output is something `read` would reparse to
/// an equal value (strings are quoted and escaped); when false, strings are
/// emitted raw, matching `str`'s human-facing behavior.
pub fn print(value: &Value, readable: bool) -> String {
    let mut out = String::new();
    print_into(value, readable, &mut out);
    out
}

fn print_into(value: &Value, readable: bool, out: &mut String) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Str(s) => {
            if readable {
                out.push('"');
                for ch in s.chars() {
                    match ch {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        other => out.push(other),
                    }
                }
                out.push('"');
            } else {
                out.push_str(s);
            }
        }
        Value::Sym(name) => out.push_str(name),
        Value::Kw(name) => {
            out.push(':');
            out.push_str(name);
        }
        Value::List(items, _) => print_seq(items, '(', ')', readable, out),
        Value::Vector(items, _) => print_seq(items, '[', ']', readable, out),
        Value::HashMap(map, _) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                print_into(&k.clone().into_value(), readable, out);
                out.push(' ');
                print_into(v, readable, out);
            }
            out.push('}');
        }
        Value::BuiltIn(_, _) => out.push_str("#<function>"),
        Value::Lambda(l) => {
            out.push_str(if l.is_macro { "#<macro>" } else { "#<lambda>" });
        }
        Value::Atom(cell) => {
            out.push_str("(atom ");
            print_into(&cell.borrow(), readable, out);
            out.push(')');
        }
    }
}

fn print_seq(items: &[Value], open: char, close: char, readable: bool, out: &mut String) {
    out.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        print_into(item, readable, out);
    }
    out.push(close);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::empty_list;

    #[test]
    fn prints_nil_and_booleans() {
        assert_eq!(print(&Value::Nil, true), "nil");
        assert_eq!(print(&Value::Bool(true), true), "true");
        assert_eq!(print(&Value::Bool(false), true), "false");
    }

    #[test]
    fn prints_readable_string_with_escapes() {
        let s = Value::str("a\"b\\c\nd");
        assert_eq!(print(&s, true), "\"a\\\"b\\\\c\\nd\"");
        assert_eq!(print(&s, false), "a\"b\\c\nd");
    }

    #[test]
    fn prints_keyword_with_leading_colon() {
        assert_eq!(print(&Value::kw("foo"), true), ":foo");
    }

    #[test]
    fn prints_list_and_vector() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(print(&list, true), "(1 2)");
        let vector = Value::vector(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(print(&vector, true), "[1 2]");
        assert_eq!(print(&empty_list(), true), "()");
    }

    #[test]
    fn prints_hashmap_in_key_order() {
        use crate::value::HashKey;
        use std::collections::BTreeMap;
        use std::rc::Rc;

        let mut map = BTreeMap::new();
        map.insert(HashKey::Kw(Rc::from("b")), Value::Int(2));
        map.insert(HashKey::Kw(Rc::from("a")), Value::Int(1));
        let v = Value::map(map);
        assert_eq!(print(&v, true), "{:a 1 :b 2}");
    }
}
