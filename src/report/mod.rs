// src/report/mod.rs
//! Renders a probe snapshot into a single self-contained HTML page: one
//! card per service plus a dump of the resolved configuration with
//! credentials masked.

use crate::config::Settings;
use crate::probe::{ProbeReport, ServiceStatus};

const STYLE: &str = "\
body{font-family:Arial,sans-serif;margin:0;padding:20px;background:#f5f5f5}\
.container{max-width:1000px;margin:0 auto;background:#fff;padding:20px;border-radius:8px}\
h1{margin-top:0}\
.card{background:#f8f9fa;padding:16px;border-radius:8px;border-left:4px solid #667eea;margin-bottom:16px}\
.card h3{margin:0 0 10px 0}\
.row{display:flex;justify-content:space-between;padding:4px 0;border-bottom:1px solid #eee}\
.label{font-weight:bold;color:#555;padding-right:12px}\
.value{color:#666;word-break:break-all;white-space:pre-wrap;text-align:right}\
.err{color:#dc3545}\
table{width:100%;border-collapse:collapse}\
td,th{padding:6px 10px;text-align:left;border-bottom:1px solid #eee}";

pub fn render(report: &ProbeReport, settings: &Settings) -> String {
    let mut cards = String::new();
    for status in report.services() {
        cards.push_str(&render_card(status));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>Service Diagnostics</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n<h1>Service Diagnostics</h1>\n\
         <p>Snapshot taken {}</p>\n{cards}{}\n</div>\n</body>\n</html>\n",
        escape(&report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        render_settings(settings),
    )
}

fn render_card(status: &ServiceStatus) -> String {
    let mut rows = String::new();

    let indicator = if status.connected {
        "&#9989; Connected"
    } else {
        "&#10060; Failed"
    };
    rows.push_str(&row("Status", indicator, false));

    if let Some(version) = &status.version {
        rows.push_str(&row("Version", &escape(version), false));
    }
    if let Some(error) = &status.error {
        rows.push_str(&row("Error", &escape(error), true));
    }
    for (key, value) in &status.extra {
        rows.push_str(&row(&prettify(key), &escape(value), false));
    }

    format!(
        "<div class=\"card\">\n<h3>{}</h3>\n{rows}</div>\n",
        escape(status.name)
    )
}

fn render_settings(settings: &Settings) -> String {
    let rows: Vec<(String, String)> = vec![
        ("Listen address".to_string(), settings.listen_addr.clone()),
        (
            "Redis".to_string(),
            format!("{}:{}", settings.redis.host, settings.redis.port),
        ),
        (
            "MySQL".to_string(),
            format!(
                "{}:{} user={} password=*** database={}",
                settings.mysql.host, settings.mysql.port, settings.mysql.user, settings.mysql.database
            ),
        ),
        (
            "PostgreSQL".to_string(),
            format!(
                "{}:{} user={} password=*** database={}",
                settings.postgres.host,
                settings.postgres.port,
                settings.postgres.user,
                settings.postgres.database
            ),
        ),
        (
            "RabbitMQ".to_string(),
            format!(
                "{}:{} management_port={}",
                settings.rabbitmq.host, settings.rabbitmq.port, settings.rabbitmq.management_port
            ),
        ),
    ];

    let body: String = rows
        .iter()
        .map(|(name, value)| {
            format!("<tr><td>{}</td><td>{}</td></tr>\n", escape(name), escape(value))
        })
        .collect();

    format!(
        "<div class=\"card\">\n<h3>Resolved Configuration</h3>\n<table>\n{body}</table>\n</div>"
    )
}

fn row(label: &str, value: &str, is_error: bool) -> String {
    let class = if is_error { "value err" } else { "value" };
    format!(
        "<div class=\"row\"><span class=\"label\">{}:</span><span class=\"{class}\">{value}</span></div>\n",
        escape(label)
    )
}

fn prettify(key: &str) -> String {
    let mut label = key.replace('_', " ");
    if let Some(first) = label.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    label
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{run_probes, ServiceStatus};
    use std::collections::BTreeMap;

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(escape("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn error_line_is_marked_red() {
        let status = ServiceStatus {
            name: "Redis",
            connected: false,
            error: Some("connection refused".to_string()),
            version: None,
            extra: BTreeMap::new(),
        };
        let card = render_card(&status);
        assert!(card.contains("class=\"value err\""));
        assert!(card.contains("connection refused"));
        assert!(card.contains("&#10060; Failed"));
    }

    #[test]
    fn card_shows_version_and_extras() {
        let mut extra = BTreeMap::new();
        extra.insert("keys".to_string(), "42".to_string());
        let status = ServiceStatus {
            name: "Redis",
            connected: true,
            error: None,
            version: Some("7.2.0".to_string()),
            extra,
        };
        let card = render_card(&status);
        assert!(card.contains("7.2.0"));
        assert!(card.contains("Keys"));
        assert!(card.contains("42"));
        assert!(card.contains("&#9989; Connected"));
    }

    #[tokio::test]
    async fn page_never_contains_passwords() {
        use crate::config::{
            MysqlEndpoint, PostgresEndpoint, RabbitMqEndpoint, RedisEndpoint, Settings,
        };

        // Port 1 on loopback refuses immediately, so every probe fails fast
        // and the page renders the failure paths, descriptors included.
        let settings = Settings {
            listen_addr: "127.0.0.1:8080".to_string(),
            redis: RedisEndpoint {
                host: "127.0.0.1".to_string(),
                port: 1,
            },
            mysql: MysqlEndpoint {
                host: "127.0.0.1".to_string(),
                port: 1,
                user: "test".to_string(),
                password: "mysql-secret-xyz".to_string(),
                database: "test".to_string(),
            },
            postgres: PostgresEndpoint {
                host: "127.0.0.1".to_string(),
                port: 1,
                user: "postgres".to_string(),
                password: "pg-secret-xyz".to_string(),
                database: "test".to_string(),
            },
            rabbitmq: RabbitMqEndpoint {
                host: "127.0.0.1".to_string(),
                port: 1,
                management_port: 15672,
            },
        };

        let report = run_probes(&settings).await;
        let page = render(&report, &settings);
        assert!(!page.contains("mysql-secret-xyz"));
        assert!(!page.contains("pg-secret-xyz"));
    }
}
