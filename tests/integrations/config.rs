use appwatch::config::Config;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A helper function to run a test with a temporary config file.
fn with_config_file<F>(toml_content: &str, test_fn: F)
where
    F: FnOnce(PathBuf),
{
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let path = file.path().to_path_buf();
    test_fn(path);
}

#[test]
fn test_load_full_valid_config() {
    let toml_content = r##"
        log_level = "debug"

        [notify]
        log_status_changes = false

        [notify.mail]
        enabled = true
        to = ["ops@example.com", "oncall@example.com"]
        cc = ["dashboard@example.com"]
        from = "Admin <no-reply@example.com>"
        subject = "#{instance.id} is #{event.statusInfo.status}"
        template = "status-changed"

        [notify.mail.smtp]
        host = "mail.example.com"
        port = 465
        username = "mailer"
        password = "hunter2"
        starttls = false

        [notify.webhook]
        enabled = true
        url = "https://hooks.example.com/notify"
        message = "#{instance.registration.name} is #{event.statusInfo.status}"
        timeout_seconds = 5
    "##;

    with_config_file(toml_content, |path| {
        let config = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(config.log_level, "debug");
        assert!(!config.notify.log_status_changes);

        let mail = config.notify.mail.unwrap();
        assert!(mail.enabled);
        assert_eq!(mail.to, vec!["ops@example.com", "oncall@example.com"]);
        assert_eq!(mail.cc, vec!["dashboard@example.com"]);
        assert_eq!(mail.from, "Admin <no-reply@example.com>");
        assert_eq!(mail.subject, "#{instance.id} is #{event.statusInfo.status}");
        assert_eq!(mail.template, "status-changed");
        assert_eq!(mail.smtp.host, "mail.example.com");
        assert_eq!(mail.smtp.port, 465);
        assert_eq!(mail.smtp.username.as_deref(), Some("mailer"));
        assert_eq!(mail.smtp.password.as_deref(), Some("hunter2"));
        assert!(!mail.smtp.starttls);

        let webhook = config.notify.webhook.unwrap();
        assert!(webhook.enabled);
        assert_eq!(webhook.url, "https://hooks.example.com/notify");
        assert_eq!(
            webhook.message,
            "#{instance.registration.name} is #{event.statusInfo.status}"
        );
        assert_eq!(webhook.timeout_seconds, 5);
    });
}

#[test]
fn test_partial_mail_config_fills_in_defaults() {
    let toml_content = r#"
        [notify.mail]
        to = ["ops@example.com"]
        from = "no-reply@example.com"
    "#;

    with_config_file(toml_content, |path| {
        let config = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(config.log_level, "info");
        assert!(config.notify.log_status_changes);
        assert!(config.notify.webhook.is_none());

        let mail = config.notify.mail.unwrap();
        assert!(mail.enabled);
        assert!(mail.cc.is_empty());
        assert_eq!(
            mail.subject,
            "#{instance.registration.name} (#{instance.id}) is #{event.statusInfo.status}"
        );
        assert_eq!(mail.template, "status-changed");
        assert_eq!(mail.smtp.host, "localhost");
        assert_eq!(mail.smtp.port, 587);
        assert!(mail.smtp.starttls);
    });
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let config = Config::load("/definitely/not/here/appwatch.toml").unwrap();
    assert_eq!(config.log_level, "info");
    assert!(config.notify.mail.is_none());
    assert!(config.notify.webhook.is_none());
}

#[test]
fn test_mail_section_without_recipients_is_rejected() {
    let toml_content = r#"
        [notify.mail]
        from = "no-reply@example.com"
    "#;

    with_config_file(toml_content, |path| {
        let result = Config::load(path.to_str().unwrap());
        assert!(result.is_err());
    });
}

#[test]
fn test_invalid_value_type_is_rejected() {
    let toml_content = r#"
        [notify.mail]
        to = "not-a-list"
        from = "no-reply@example.com"
    "#;

    with_config_file(toml_content, |path| {
        let result = Config::load(path.to_str().unwrap());
        assert!(result.is_err());
    });
}
