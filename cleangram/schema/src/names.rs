//! Identifier transforms for generated code.
//!
//! Pure string functions shared by the model and the renderer:
//!
//! - [`snake`] - `TelegramObject` -> `telegram_object`, `getMe` -> `get_me`
//! - [`upper_first`] - `getMe` -> `GetMe`
//! - [`is_reserved`] / [`alias`] - keep argument names usable as identifiers

/// Keywords of the target language. An argument whose wire name is one of
/// these gets a suffixed identifier and a wire-name initializer.
pub const RESERVED_WORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Converts a camelCase or PascalCase name to snake_case.
///
/// Every character that is not lowercase starts a new word, so each digit
/// gets its own underscore. Leading underscores are dropped.
///
/// ## Examples
///
/// ```
/// use cleangram_schema::names::snake;
///
/// assert_eq!(snake("TelegramObject"), "telegram_object");
/// assert_eq!(snake("getMe"), "get_me");
/// assert_eq!(snake("sendMessage"), "send_message");
/// assert_eq!(snake("InputMediaMpeg4"), "input_media_mpeg_4");
/// ```
pub fn snake(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if c.is_lowercase() {
            result.push(c);
        } else {
            result.push('_');
            result.extend(c.to_lowercase());
        }
    }
    result.trim_start_matches('_').to_string()
}

/// Returns `text` with its first character forced to uppercase.
///
/// ## Examples
///
/// ```
/// use cleangram_schema::names::upper_first;
///
/// assert_eq!(upper_first("getMe"), "GetMe");
/// assert_eq!(upper_first("User"), "User");
/// assert_eq!(upper_first(""), "");
/// ```
pub fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns true if `name` collides with a keyword of the target language.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Returns the identifier to use for a wire name.
///
/// ## Examples
///
/// ```
/// use cleangram_schema::names::alias;
///
/// assert_eq!(alias("from"), "from_");
/// assert_eq!(alias("chat_id"), "chat_id");
/// ```
pub fn alias(name: &str) -> String {
    if is_reserved(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}
