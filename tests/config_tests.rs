use anyhow::Result;

use crate::support::test_config;

/// Test: A fully populated configuration validates
#[test]
fn test_complete_config_is_valid() -> Result<()> {
    let config = test_config("http://localhost");

    config.validate()?;

    let summary = config.summary();
    assert!(summary.email && summary.whatsapp && summary.telegram && summary.sms);
    assert!(summary.karma_tracker);

    Ok(())
}

/// Test: Blank credentials are all named in one error
#[test]
fn test_blank_credentials_reported() -> Result<()> {
    let mut config = test_config("http://localhost");
    config.telegram_bot_token = "  ".to_string();
    config.karma_tracker_api_key = String::new();

    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("TELEGRAM_BOT_TOKEN"), "{}", err);
    assert!(err.contains("KARMA_TRACKER_API_KEY"), "{}", err);
    assert!(!err.contains("SMTP_USERNAME"), "{}", err);

    let summary = config.summary();
    assert!(!summary.telegram);
    assert!(!summary.karma_tracker);
    assert!(summary.whatsapp);

    Ok(())
}

/// Test: Channels without any complete provider only warn
#[test]
fn test_missing_channel_providers_warn() -> Result<()> {
    let mut config = test_config("http://localhost");
    assert!(config.warnings().is_empty());

    config.twilio_phone_number = String::new();
    config.fast2sms_api_key = String::new();
    config.whatsapp_access_token = String::new();
    config.twilio_whatsapp_number = " ".to_string();

    config.validate()?;

    let warnings = config.warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("No SMS provider configured"));
    assert!(warnings[1].starts_with("No WhatsApp provider configured"));

    let summary = config.summary();
    assert!(!summary.sms);
    assert!(!summary.whatsapp);

    Ok(())
}

/// Test: Alternative providers count as configured channels
#[test]
fn test_alternative_providers_configure_channels() -> Result<()> {
    let mut config = test_config("http://localhost");
    config.twilio_phone_number = String::new();
    config.whatsapp_phone_number_id = String::new();

    assert!(!config.has_twilio_sms());
    assert!(config.has_fast2sms());
    assert!(!config.has_whatsapp_cloud());
    assert!(config.has_twilio_whatsapp());
    assert!(config.warnings().is_empty());

    let summary = config.summary();
    assert!(summary.sms && summary.whatsapp);

    Ok(())
}
