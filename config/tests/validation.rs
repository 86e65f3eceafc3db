//! End-to-end behaviour of the two validation phases.

use serde_json::json;
use zipline_config::{
    validate, validate_with_mode, BuildMode, ConfigDocument, Datasource, Expected,
    FeaturesConfig, RatelimitConfig, UploaderConfig, UrlsConfig, ValidatedConfig,
    ValidationError, WebsiteConfig,
};

fn minimal() -> serde_json::Value {
    json!({"core": {"secret": "abcdefgh", "database_url": "postgres://localhost/zipline"}})
}

fn with(section: &str, value: serde_json::Value) -> ConfigDocument {
    let mut doc = minimal();
    doc[section] = value;
    ConfigDocument::from(doc)
}

fn required_messages(doc: &ConfigDocument) -> Vec<String> {
    match validate(doc) {
        Err(ValidationError::Required(errs)) => errs.messages().to_vec(),
        other => panic!("expected required-field errors, got {other:?}"),
    }
}

fn revalidate(config: &ValidatedConfig) -> ValidatedConfig {
    validate(&config.to_document().unwrap()).unwrap()
}

#[test]
fn minimal_document_gets_every_default() {
    let config = validate(&ConfigDocument::from(minimal())).unwrap();

    assert!(!config.core.https);
    assert_eq!(config.core.host, "0.0.0.0");
    assert_eq!(config.core.port, 3000);
    assert!(!config.core.logger);
    assert_eq!(config.core.stats_interval, 1800);
    assert_eq!(config.core.invites_interval, 1800);
    let Datasource::Local(local) = &config.datasource else {
        panic!("expected local datasource");
    };
    assert_eq!(local.directory, "./uploads");
    assert_eq!(config.uploader, UploaderConfig::default());
    assert_eq!(config.uploader.route, "/u");
    assert_eq!(config.urls, UrlsConfig::default());
    assert_eq!(config.ratelimit, RatelimitConfig { user: 0, admin: 0 });
    assert_eq!(config.website, WebsiteConfig::default());
    assert_eq!(config.website.title, "Zipline");
    assert_eq!(config.website.external_links.len(), 2);
    assert_eq!(config.website.external_links[0].label, "Zipline");
    assert_eq!(config.website.external_links[1].link, "https://zipline.diced.tech/");
    assert_eq!(config.discord, None);
    assert_eq!(config.oauth, None);
    assert_eq!(config.features, FeaturesConfig { invites: true, oauth_registration: false });
}

#[test]
fn local_directory_is_kept_or_defaulted() {
    for (input, expected) in [
        (json!({"type": "local", "local": {"directory": "/srv/uploads"}}), "/srv/uploads"),
        (json!({"type": "local"}), "./uploads"),
        (json!({}), "./uploads"),
    ] {
        let config = validate(&with("datasource", input)).unwrap();
        assert_eq!(config.datasource, Datasource::Local(zipline_config::LocalDatasource {
            directory: expected.to_string(),
        }));
    }
}

#[test]
fn secret_needs_eight_characters() {
    let mut doc = minimal();
    doc["core"]["secret"] = json!("abcdefg");
    match validate(&ConfigDocument::from(doc.clone())) {
        Err(ValidationError::Type(err)) => {
            assert_eq!(err.path, "core.secret");
            assert_eq!(err.expected, Expected::MinLength(8));
        }
        other => panic!("expected type error, got {other:?}"),
    }

    doc["core"]["secret"] = json!("abcdefgh");
    assert!(validate(&ConfigDocument::from(doc)).is_ok());
}

#[test]
fn missing_database_url_is_a_type_error() {
    let doc = ConfigDocument::from(json!({"core": {"secret": "abcdefgh"}}));
    let Err(ValidationError::Type(err)) = validate(&doc) else {
        panic!("expected type error");
    };
    assert_eq!(err.path, "core.database_url");
    assert_eq!(err.found, "missing");
}

#[test]
fn s3_reports_only_the_missing_fields() {
    let messages = required_messages(&with("datasource", json!({"type": "s3", "s3": {"bucket": "b"}})));
    assert_eq!(
        messages,
        vec![
            "datasource.s3.access_key_id is a required field",
            "datasource.s3.secret_access_key is a required field",
            "datasource.s3.endpoint is a required field",
        ]
    );
}

#[test]
fn s3_every_combination_of_missing_fields_is_listed() {
    let fields = ["access_key_id", "secret_access_key", "bucket", "endpoint"];
    for mask in 0u8..16 {
        let mut s3 = serde_json::Map::new();
        let mut expected = Vec::new();
        for (i, field) in fields.iter().enumerate() {
            if mask & (1 << i) == 0 {
                s3.insert((*field).to_string(), json!("value"));
            } else {
                expected.push(format!("datasource.s3.{field} is a required field"));
            }
        }
        let doc = with("datasource", json!({"type": "s3", "s3": s3}));
        if expected.is_empty() {
            assert!(validate(&doc).is_ok());
        } else {
            assert_eq!(required_messages(&doc), expected, "mask {mask:#06b}");
        }
    }
}

#[test]
fn swift_every_combination_of_missing_fields_is_listed() {
    let fields = ["container", "project_id", "auth_endpoint", "password", "username"];
    for mask in 0u8..32 {
        let mut swift = serde_json::Map::new();
        let mut expected = Vec::new();
        for (i, field) in fields.iter().enumerate() {
            if mask & (1 << i) == 0 {
                swift.insert((*field).to_string(), json!("value"));
            } else {
                expected.push(format!("datasource.swift.{field} is a required field"));
            }
        }
        let doc = with("datasource", json!({"type": "swift", "swift": swift}));
        if expected.is_empty() {
            assert!(validate(&doc).is_ok());
        } else {
            assert_eq!(required_messages(&doc), expected, "mask {mask:#07b}");
        }
    }
}

#[test]
fn type_errors_win_over_required_fields() {
    let doc = with("datasource", json!({"type": "s3", "s3": {"bucket": 7}}));
    let Err(ValidationError::Type(err)) = validate(&doc) else {
        panic!("expected type error");
    };
    assert_eq!(err.path, "datasource.s3.bucket");
}

#[test]
fn non_finite_embed_color_is_rejected() {
    for color in [".nan", ".inf", "-.inf"] {
        let yaml = format!(
            "core: {{ secret: abcdefgh, database_url: x }}\n\
             discord:\n  url: https://discord.com/api/webhooks/1/abc\n  shorten:\n    embed:\n      color: {color}\n"
        );
        let Err(ValidationError::Type(err)) = validate(&ConfigDocument::from_yaml_str(&yaml).unwrap()) else {
            panic!("expected type error for color {color}");
        };
        assert_eq!(err.path, "discord.shorten.embed.color");
        assert_eq!(err.expected, Expected::Finite);
    }
}

#[test]
fn embed_color_survives_json_output() {
    let config = validate(&with(
        "discord",
        json!({"url": "https://discord.com/api/webhooks/1/abc", "upload": {"embed": {"color": 3_092_790}}}),
    ))
    .unwrap();
    let rendered = serde_json::to_string(&config).unwrap();
    let reparsed = validate(&ConfigDocument::from_json_str(&rendered).unwrap()).unwrap();
    assert_eq!(reparsed, config);
}

#[test]
fn omitted_discord_is_null_not_partial() {
    let config = validate(&ConfigDocument::from(minimal())).unwrap();
    assert!(config.discord.is_none());

    let config = validate(&with("discord", json!({"url": "https://discord.com/api/webhooks/1/abc"}))).unwrap();
    let discord = config.discord.unwrap();
    assert_eq!(discord.username, "Zipline");
    assert!(discord.upload.is_none());
    assert!(discord.shorten.is_none());
}

#[test]
fn oauth_section_is_fully_populated_when_present() {
    let config = validate(&with("oauth", json!({"github_client_id": "id"}))).unwrap();
    let oauth = config.oauth.unwrap();
    assert_eq!(oauth.github_client_id.as_deref(), Some("id"));
    assert_eq!(oauth.github_client_secret, None);
    assert_eq!(oauth.discord_client_id, None);
}

#[test]
fn build_mode_yields_none_for_invalid_documents() {
    let missing_secret = ConfigDocument::from(json!({"core": {"database_url": "x"}}));
    assert_eq!(validate_with_mode(&missing_secret, BuildMode::DockerBuild), Ok(None));
    assert!(validate_with_mode(&missing_secret, BuildMode::Runtime).is_err());
}

#[test]
fn revalidating_is_idempotent() {
    let documents = [
        ConfigDocument::from(minimal()),
        with(
            "datasource",
            json!({"type": "s3", "s3": {
                "access_key_id": "id", "secret_access_key": "secret",
                "bucket": "b", "endpoint": "minio.local", "port": 9000, "use_ssl": true
            }}),
        ),
        with(
            "datasource",
            json!({"type": "swift", "swift": {
                "container": "c", "project_id": "p", "auth_endpoint": "https://auth",
                "password": "pw", "username": "u"
            }}),
        ),
        with(
            "discord",
            json!({
                "url": "https://discord.com/api/webhooks/1/abc",
                "upload": {"content": "uploaded", "embed": {"title": "File", "color": 255}},
                "shorten": {}
            }),
        ),
        with("oauth", json!({"discord_client_id": "id", "discord_client_secret": "secret"})),
    ];

    for doc in &documents {
        let first = validate(doc).unwrap();
        let second = revalidate(&first);
        assert_eq!(first, second);
        assert_eq!(revalidate(&second), second);
    }
}
