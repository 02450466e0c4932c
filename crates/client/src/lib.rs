pub mod rest;

pub use rest::RestPanelApi;

#[must_use]
pub fn adapter_name() -> &'static str {
    "sqlboard-client"
}

#[cfg(test)]
mod tests {
    use super::adapter_name;

    #[test]
    fn adapter_name_is_stable() {
        assert_eq!(adapter_name(), "sqlboard-client");
    }
}
