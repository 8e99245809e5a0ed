use crate::atom::{Atom, Handle, Value};

/// Renders a value in its wire form, e.g. `(FloatValue 1 2.5)`.
pub fn encode_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Renders an association list: `((KEY . VALUE)(KEY2 . VALUE2)...)`.
pub fn encode_alist(pairs: &[(Handle, Value)]) -> String {
    let mut out = String::from("(");
    for (key, value) in pairs {
        out.push('(');
        out.push_str(key.to_short_string());
        out.push_str(" . ");
        write_value(&mut out, value);
        out.push(')');
    }
    out.push(')');
    out
}

/// Association list of everything currently attached to `atom`.
pub fn encode_atom_values(atom: &Atom) -> String {
    encode_alist(&atom.values())
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Link(children) => {
            out.push_str("(LinkValue");
            if !children.is_empty() {
                out.push(' ');
                for child in children {
                    write_value(out, child);
                }
            }
            out.push(')');
        }
        Value::Float(numbers) => {
            out.push_str("(FloatValue");
            for number in numbers {
                out.push(' ');
                out.push_str(&format_double(*number));
            }
            out.push(')');
        }
        Value::SimpleTruth {
            strength,
            confidence,
        } => {
            out.push_str("(stv ");
            out.push_str(&format_double(*strength));
            out.push(' ');
            out.push_str(&format_double(*confidence));
            out.push(')');
        }
        Value::CountTruth {
            strength,
            confidence,
            count,
        } => {
            out.push_str("(CountTruthValue ");
            out.push_str(&format_double(*strength));
            out.push(' ');
            out.push_str(&format_double(*confidence));
            out.push(' ');
            out.push_str(&format_double(*count));
            out.push(')');
        }
        // Embedded double quotes are written as-is and will not decode.
        Value::String(items) => {
            out.push_str("(StringValue");
            for item in items {
                out.push_str(" \"");
                out.push_str(item);
                out.push('"');
            }
            out.push(')');
        }
    }
}

/// Deepest parenthesis nesting of wire text, as the parser counts it.
///
/// Parentheses inside quoted strings are not counted.
pub fn nesting_depth(text: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut quoted = false;
    for c in text.chars() {
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            ')' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Shortest text that parses back to exactly `number`.
///
/// Plain decimal in the everyday range, exponent form outside it so that
/// tiny and huge magnitudes stay short.
pub fn format_double(number: f64) -> String {
    if !number.is_finite() || number == 0.0 {
        return number.to_string();
    }
    let magnitude = number.abs();
    if (1e-5..1e16).contains(&magnitude) {
        number.to_string()
    } else {
        format!("{:e}", number)
    }
}
