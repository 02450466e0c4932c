pub mod api;
pub mod blob;
pub mod cascade;
pub mod controller;
pub mod history;
pub mod operation;
pub mod profiles;
pub mod query_spec;
pub mod result_view;

#[must_use]
pub fn domain_name() -> &'static str {
    "sqlboard-core"
}

#[cfg(test)]
mod tests {
    use super::domain_name;

    #[test]
    fn domain_name_is_stable() {
        assert_eq!(domain_name(), "sqlboard-core");
    }
}
