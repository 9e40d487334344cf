//! JVM descriptors for resolved Java type names.

/// Erase a type-like string: drop whitespace and generic arguments, and turn a
/// varargs suffix into an array suffix.
pub fn erase(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0u32;
    for ch in raw.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() => {}
            c if depth == 0 => out.push(c),
            _ => {}
        }
    }
    match out.strip_suffix("...") {
        Some(base) => format!("{base}[]"),
        None => out,
    }
}

fn primitive_descriptor(name: &str) -> Option<char> {
    Some(match name {
        "void" => 'V',
        "boolean" => 'Z',
        "byte" => 'B',
        "char" => 'C',
        "short" => 'S',
        "int" => 'I',
        "long" => 'J',
        "float" => 'F',
        "double" => 'D',
        _ => return None,
    })
}

pub fn is_primitive(name: &str) -> bool {
    name != "void" && primitive_descriptor(name).is_some()
}

/// Field descriptor for a (resolved or simple) type name.
///
/// `java.lang.String[]` becomes `[Ljava/lang/String;`.
pub fn type_descriptor(ty: &str) -> String {
    let erased = erase(ty);
    let mut base = erased.as_str();
    let mut out = String::new();
    while let Some(stripped) = base.strip_suffix("[]") {
        out.push('[');
        base = stripped;
    }
    match primitive_descriptor(base) {
        Some(c) => out.push(c),
        None => {
            out.push('L');
            out.push_str(&base.replace('.', "/"));
            out.push(';');
        }
    }
    out
}

/// Method descriptor, e.g. `(Ljava/lang/String;I)V`.
pub fn method_descriptor(return_type: &str, parameter_types: &[String]) -> String {
    let mut out = String::from("(");
    for param in parameter_types {
        out.push_str(&type_descriptor(param));
    }
    out.push(')');
    out.push_str(&type_descriptor(return_type));
    out
}
