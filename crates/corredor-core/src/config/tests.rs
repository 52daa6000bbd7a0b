use super::*;

#[test]
fn test_config_defaults() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.corredor.name, "Corredor");
    assert_eq!(cfg.corredor.log_level, "info");
    assert!(cfg.auth.enabled);
    assert_eq!(cfg.provider.default, "gemini");
    assert_eq!(cfg.extract.uf_rate_clp, 37_000);
    assert_eq!(cfg.extract.usd_rate_clp, 950);
    assert!(cfg.followup.enabled);
    assert_eq!(cfg.followup.poll_interval_secs, 3_600);
    assert_eq!(cfg.sheets.fallback_tab, "Propiedades");
    assert!(cfg.channel.whatsapp.is_none());
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
        [corredor]
        name = "Tasador"
        log_level = "debug"

        [provider]
        default = "openai"

        [provider.gemini]
        api_key = "AIza-test"
        model = "gemini-2.0-flash"

        [channel.whatsapp]
        enabled = true
        bridge_url = "http://localhost:9999"
        allowed_users = ["56911223344"]

        [sheets]
        fallback_sheet_id = "1abcDEF"

        [followup]
        poll_interval_secs = 120

        [notify]
        admin_phone = "56955556666"
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.corredor.name, "Tasador");
    assert_eq!(cfg.provider.default, "openai");
    assert_eq!(cfg.provider.gemini.api_key, "AIza-test");
    assert_eq!(cfg.provider.gemini.model, "gemini-2.0-flash");

    let wa = cfg.channel.whatsapp.expect("whatsapp section");
    assert!(wa.enabled);
    assert_eq!(wa.bridge_url, "http://localhost:9999");
    assert_eq!(wa.allowed_users, vec!["56911223344"]);

    assert_eq!(cfg.sheets.fallback_sheet_id, "1abcDEF");
    assert_eq!(cfg.sheets.fallback_tab, "Propiedades");
    assert_eq!(cfg.followup.poll_interval_secs, 120);
    assert_eq!(cfg.notify.admin_phone, "56955556666");
}

#[test]
fn test_partial_section_keeps_field_defaults() {
    let toml_str = r#"
        [followup]
        enabled = false
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert!(!cfg.followup.enabled);
    assert_eq!(cfg.followup.poll_interval_secs, 3_600);
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let cfg = load("/nonexistent/corredor-test.toml").unwrap();
    assert_eq!(cfg.corredor.data_dir, "~/.corredor");
    assert_eq!(cfg.memory.db_path, "~/.corredor/data/corredor.db");
}

#[test]
fn test_shellexpand_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let expanded = shellexpand("~/x/y");
        assert_eq!(expanded, format!("{}/x/y", home.to_string_lossy()));
    }
    assert_eq!(shellexpand("/abs/path"), "/abs/path");
}
