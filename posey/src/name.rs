/// Separator between a namespace prefix and an object's short name.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Strip everything up to and including the last namespace separator.
///
/// `"rig01:arm:hand_L"` becomes `"hand_L"`; names without a separator are
/// returned unchanged.
pub fn normalize(name: &str) -> &str {
    match name.rfind(NAMESPACE_SEPARATOR) {
        Some(i) => &name[i + NAMESPACE_SEPARATOR.len_utf8()..],
        None => name,
    }
}
