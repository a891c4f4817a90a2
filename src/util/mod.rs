pub mod fingerprint;
pub mod release;
pub mod size;

/// Sanitize a filename to be safe for the filesystem.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(
        |c: char| !c.is_alphanumeric() && c != '.' && c != '-' && c != '_',
        "_",
    )
}
