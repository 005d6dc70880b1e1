use uuid::Uuid;

/// Returns a fresh 32-character lowercase hex token.
///
/// Block ids, variable ids and asset ids all come from here; the format matches
/// the md5-style keys the project schema uses for assets.
pub fn next_id() -> String {
    Uuid::new_v4().simple().to_string()
}
