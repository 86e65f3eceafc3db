//! Schema Normalizer: type checks every field and fills in defaults.
//!
//! Absent sections are replaced by their default as a whole. Stops at the
//! first [`TypeError`]; backend requirements are left to [`crate::validate`].

use crate::error::TypeError;
use crate::schema::Section;
use crate::types::*;
use crate::ConfigDocument;

pub fn normalize(document: &ConfigDocument) -> Result<DraftConfig, TypeError> {
    let root = Section::root(document.as_value())?;

    Ok(DraftConfig {
        core: core(&root.required_section("core")?)?,
        datasource: root
            .section("datasource")?
            .map(|s| datasource(&s))
            .transpose()?
            .unwrap_or_default(),
        uploader: root
            .section("uploader")?
            .map(|s| uploader(&s))
            .transpose()?
            .unwrap_or_default(),
        urls: root
            .section("urls")?
            .map(|s| urls(&s))
            .transpose()?
            .unwrap_or_default(),
        ratelimit: root
            .section("ratelimit")?
            .map(|s| ratelimit(&s))
            .transpose()?
            .unwrap_or_default(),
        website: root
            .section("website")?
            .map(|s| website(&s))
            .transpose()?
            .unwrap_or_default(),
        discord: root
            .nullish_section("discord")?
            .map(|s| discord(&s))
            .transpose()?,
        oauth: root
            .nullish_section("oauth")?
            .map(|s| oauth(&s))
            .transpose()?,
        features: root
            .section("features")?
            .map(|s| features(&s))
            .transpose()?
            .unwrap_or_default(),
    })
}

fn core(section: &Section<'_>) -> Result<CoreConfig, TypeError> {
    Ok(CoreConfig {
        https: section.bool_or("https", false)?,
        secret: section.min_length_string("secret", MIN_SECRET_LENGTH)?,
        host: section.string_or("host", DEFAULT_HOST.to_string())?,
        port: section.integer_or("port", DEFAULT_PORT)?,
        database_url: section.string("database_url")?,
        logger: section.bool_or("logger", false)?,
        stats_interval: section.integer_or("stats_interval", DEFAULT_STATS_INTERVAL)?,
        invites_interval: section.integer_or("invites_interval", DEFAULT_INVITES_INTERVAL)?,
    })
}

fn datasource(section: &Section<'_>) -> Result<DatasourceDraft, TypeError> {
    Ok(DatasourceDraft {
        kind: section.enum_or("type", DatasourceKind::Local)?,
        local: section
            .section("local")?
            .map(|s| local(&s))
            .transpose()?
            .unwrap_or_default(),
        s3: section
            .section("s3")?
            .map(|s| s3(&s))
            .transpose()?
            .unwrap_or_default(),
        swift: section
            .section("swift")?
            .map(|s| swift(&s))
            .transpose()?
            .unwrap_or_default(),
    })
}

fn local(section: &Section<'_>) -> Result<LocalDatasource, TypeError> {
    let defaults = LocalDatasource::default();
    Ok(LocalDatasource {
        directory: section.string_or("directory", defaults.directory)?,
    })
}

// Credentials stay optional here so that every missing one can be
// reported together by the validator.
fn s3(section: &Section<'_>) -> Result<S3Draft, TypeError> {
    let defaults = S3Draft::default();
    Ok(S3Draft {
        access_key_id: section.nullable_string("access_key_id")?,
        secret_access_key: section.nullable_string("secret_access_key")?,
        endpoint: section.nullable_string("endpoint")?,
        port: section.nullable_integer("port")?,
        bucket: section.nullable_string("bucket")?,
        force_s3_path: section.bool_or("force_s3_path", defaults.force_s3_path)?,
        region: section.string_or("region", defaults.region)?,
        use_ssl: section.bool_or("use_ssl", defaults.use_ssl)?,
    })
}

fn swift(section: &Section<'_>) -> Result<SwiftDraft, TypeError> {
    let defaults = SwiftDraft::default();
    Ok(SwiftDraft {
        username: section.nullable_string("username")?,
        password: section.nullable_string("password")?,
        auth_endpoint: section.nullable_string("auth_endpoint")?,
        container: section.nullable_string("container")?,
        project_id: section.nullable_string("project_id")?,
        domain_id: section.string_or("domain_id", defaults.domain_id)?,
        region_id: section.nullable_string("region_id")?,
    })
}

fn uploader(section: &Section<'_>) -> Result<UploaderConfig, TypeError> {
    let defaults = UploaderConfig::default();
    Ok(UploaderConfig {
        route: section.string_or("route", defaults.route)?,
        embed_route: section.string_or("embed_route", defaults.embed_route)?,
        length: section.integer_or("length", defaults.length)?,
        admin_limit: section.integer_or("admin_limit", defaults.admin_limit)?,
        user_limit: section.integer_or("user_limit", defaults.user_limit)?,
        disabled_extensions: section
            .string_array_or("disabled_extensions", defaults.disabled_extensions)?,
        format_date: section.string_or("format_date", defaults.format_date)?,
    })
}

fn urls(section: &Section<'_>) -> Result<UrlsConfig, TypeError> {
    let defaults = UrlsConfig::default();
    Ok(UrlsConfig {
        route: section.string_or("route", defaults.route)?,
        length: section.integer_or("length", defaults.length)?,
    })
}

fn ratelimit(section: &Section<'_>) -> Result<RatelimitConfig, TypeError> {
    Ok(RatelimitConfig {
        user: section.integer_or("user", 0)?,
        admin: section.integer_or("admin", 0)?,
    })
}

fn website(section: &Section<'_>) -> Result<WebsiteConfig, TypeError> {
    let defaults = WebsiteConfig::default();
    Ok(WebsiteConfig {
        title: section.string_or("title", defaults.title)?,
        show_files_per_user: section
            .bool_or("show_files_per_user", defaults.show_files_per_user)?,
        show_version: section.bool_or("show_version", defaults.show_version)?,
        disable_media_preview: section
            .bool_or("disable_media_preview", defaults.disable_media_preview)?,
        external_links: section.object_array_or(
            "external_links",
            defaults.external_links,
            |link| {
                Ok(ExternalLink {
                    label: link.string("label")?,
                    link: link.string("link")?,
                })
            },
        )?,
    })
}

fn discord(section: &Section<'_>) -> Result<DiscordConfig, TypeError> {
    Ok(DiscordConfig {
        url: section.string("url")?,
        username: section.string_or("username", DEFAULT_DISCORD_USERNAME.to_string())?,
        avatar_url: section.string_or("avatar_url", DEFAULT_DISCORD_AVATAR_URL.to_string())?,
        upload: section
            .nullish_section("upload")?
            .map(|s| discord_content(&s))
            .transpose()?,
        shorten: section
            .nullish_section("shorten")?
            .map(|s| discord_content(&s))
            .transpose()?,
    })
}

fn discord_content(section: &Section<'_>) -> Result<DiscordContent, TypeError> {
    Ok(DiscordContent {
        content: section.nullable_string("content")?,
        embed: section
            .nullish_section("embed")?
            .map(|s| discord_embed(&s))
            .transpose()?,
    })
}

fn discord_embed(section: &Section<'_>) -> Result<DiscordEmbed, TypeError> {
    let defaults = DiscordEmbed::default();
    Ok(DiscordEmbed {
        title: section.nullable_string("title")?,
        description: section.nullable_string("description")?,
        footer: section.nullable_string("footer")?,
        color: section.nullable_finite_number("color")?,
        thumbnail: section.bool_or("thumbnail", defaults.thumbnail)?,
        image: section.bool_or("image", defaults.image)?,
        timestamp: section.bool_or("timestamp", defaults.timestamp)?,
    })
}

fn oauth(section: &Section<'_>) -> Result<OauthConfig, TypeError> {
    Ok(OauthConfig {
        github_client_id: section.nullable_string("github_client_id")?,
        github_client_secret: section.nullable_string("github_client_secret")?,
        discord_client_id: section.nullable_string("discord_client_id")?,
        discord_client_secret: section.nullable_string("discord_client_secret")?,
    })
}

fn features(section: &Section<'_>) -> Result<FeaturesConfig, TypeError> {
    let defaults = FeaturesConfig::default();
    Ok(FeaturesConfig {
        invites: section.bool_or("invites", defaults.invites)?,
        oauth_registration: section
            .bool_or("oauth_registration", defaults.oauth_registration)?,
    })
}
