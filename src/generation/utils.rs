//! Identifier normalization for generated artifacts
//!
//! Every name that ends up in an artifact passes through here. All functions
//! are pure: the same input always produces the same identifier, which is what
//! lets a `Reference { target: "User" }` anywhere in a specification land on
//! the exact type name a `User` DTO definition produces.

/// Words that can never be used verbatim as a generated identifier.
///
/// Compared case-insensitively, so `List` and `list` both collide.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "and", "array", "as", "async", "await", "bool", "break", "callable", "case",
    "catch", "class", "clone", "const", "continue", "declare", "default", "do", "echo", "else",
    "enum", "extends", "false", "final", "float", "fn", "for", "foreach", "function", "global",
    "goto", "if", "implements", "import", "in", "include", "instanceof", "int", "interface",
    "is", "iterable", "let", "list", "match", "mixed", "namespace", "new", "null", "object",
    "or", "parent", "private", "protected", "public", "readonly", "require", "return", "self",
    "static", "string", "struct", "super", "switch", "this", "throw", "trait", "true", "try",
    "type", "use", "var", "void", "while", "xor", "yield",
];

/// Returns true when `word` is reserved in generated code.
pub fn is_reserved_word(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

/// Converts a string to snake_case.
///
/// Any character that is not ASCII alphanumeric acts as a word separator, so
/// `user-id`, `user.id` and `user id` all become `user_id`.
///
/// # Examples
/// ```
/// use sdkforge::generation::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
/// assert_eq!(to_snake_case("/users/{id}"), "users_id");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_ascii_uppercase() {
            // Word boundary on a lower -> upper transition
            if prev_is_lowercase {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_ascii_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        } else {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    result.trim_matches('_').to_string()
}

/// Converts a string to UpperCamelCase (PascalCase).
///
/// # Examples
/// ```
/// use sdkforge::generation::utils::to_proper_case;
///
/// assert_eq!(to_proper_case("find_pets_by_status"), "FindPetsByStatus");
/// assert_eq!(to_proper_case("http_response"), "HttpResponse");
/// ```
pub fn to_proper_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}

/// Converts a string to camelCase.
///
/// # Examples
/// ```
/// use sdkforge::generation::utils::to_camel_case;
///
/// assert_eq!(to_camel_case("find_pets_by_status"), "findPetsByStatus");
/// assert_eq!(to_camel_case("user-id"), "userId");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_proper_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
    }
}

/// Normalizes an arbitrary identifier into a safe snake_case name.
///
/// Never returns an empty string and never returns a reserved word.
pub fn normalize_identifier(raw: &str) -> String {
    guard_variable(to_snake_case(raw))
}

/// Type name for a schema or inline shape.
///
/// # Examples
/// ```
/// use sdkforge::generation::utils::type_name;
///
/// assert_eq!(type_name("User"), "User");
/// assert_eq!(type_name("user-profile"), "UserProfile");
/// assert_eq!(type_name("list"), "ListType");
/// ```
pub fn type_name(base: &str) -> String {
    guard_type(to_proper_case(base))
}

/// Type name of the DTO describing one endpoint response.
pub fn response_type_name(endpoint_name: &str, status: u16) -> String {
    format!("{}Response", type_name(&format!("{endpoint_name}{status}")))
}

/// Type name of the request artifact for an endpoint.
pub fn request_type_name(endpoint_name: &str) -> String {
    type_name(endpoint_name)
}

/// Resource grouping name for an endpoint collection.
pub fn resource_group_name(collection: &str) -> String {
    type_name(collection)
}

/// Variable (field, property or parameter) name.
///
/// A leading `:` path-placeholder marker is ignored.
///
/// # Examples
/// ```
/// use sdkforge::generation::utils::variable_name;
///
/// assert_eq!(variable_name("user-id"), "userId");
/// assert_eq!(variable_name(":id"), "id");
/// assert_eq!(variable_name("class"), "class_");
/// ```
pub fn variable_name(raw: &str) -> String {
    guard_variable(to_camel_case(raw.trim_start_matches(':')))
}

fn guard_type(name: String) -> String {
    if name.is_empty() {
        return "Unnamed".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("Type{name}");
    }
    if is_reserved_word(&name) {
        return format!("{name}Type");
    }
    name
}

fn guard_variable(name: String) -> String {
    if name.is_empty() {
        return "value".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{name}");
    }
    if is_reserved_word(&name) {
        return format!("{name}_");
    }
    name
}
