use uuid::Uuid;

/// `{prefix}_{uuid-v4}`; collisions are negligible.
pub fn random_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}
