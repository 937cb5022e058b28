//! Adapter catalog
//!
//! Known datasource adapter kinds and the `datasources.yml` template each
//! one starts from.

/// Placeholder written into every new datasource entry
pub const NAME_PLACEHOLDER: &str = "MYDATASOURCENAME";

/// Connection fields an adapter declares in its template
struct AdapterTemplate {
    kind: &'static str,
    fields: &'static [(&'static str, &'static str)],
}

const CATALOG: &[AdapterTemplate] = &[
    AdapterTemplate {
        kind: "athena",
        fields: &[
            ("region", "us-east-1"),
            ("database", "default"),
            ("workgroup", "primary"),
            ("s3_staging_dir", "s3://YOUR_BUCKET/athena-results/"),
        ],
    },
    AdapterTemplate {
        kind: "bigquery",
        fields: &[
            ("project_id", "YOUR_GCP_PROJECT"),
            ("dataset", "YOUR_DATASET"),
            ("location", "US"),
        ],
    },
    AdapterTemplate {
        kind: "databricks",
        fields: &[
            ("host", "YOUR_WORKSPACE.cloud.databricks.com"),
            ("http_path", "/sql/1.0/warehouses/YOUR_WAREHOUSE_ID"),
            ("catalog", "main"),
            ("schema", "default"),
        ],
    },
    AdapterTemplate {
        kind: "druid",
        fields: &[("host", "localhost"), ("port", "8082"), ("protocol", "http")],
    },
    AdapterTemplate {
        kind: "duckdb",
        fields: &[("file", "data/warehouse.duckdb")],
    },
    AdapterTemplate {
        kind: "mysql",
        fields: &[("host", "localhost"), ("port", "3306"), ("database", "mysql")],
    },
    AdapterTemplate {
        kind: "postgres",
        fields: &[
            ("host", "localhost"),
            ("port", "5432"),
            ("database", "postgres"),
            ("schema", "public"),
        ],
    },
    AdapterTemplate {
        kind: "redshift",
        fields: &[
            ("host", "YOUR_CLUSTER.redshift.amazonaws.com"),
            ("port", "5439"),
            ("database", "dev"),
            ("schema", "public"),
        ],
    },
    AdapterTemplate {
        kind: "snowflake",
        fields: &[
            ("account_identifier", "YOUR_ACCOUNT_IDENTIFIER"),
            ("warehouse", "COMPUTE_WH"),
            ("database", "YOUR_DATABASE"),
            ("schema", "PUBLIC"),
            ("role", "PUBLIC"),
        ],
    },
    AdapterTemplate {
        kind: "sqlserver",
        fields: &[
            ("host", "localhost"),
            ("port", "1433"),
            ("database", "master"),
            ("schema", "dbo"),
        ],
    },
    AdapterTemplate {
        kind: "trino",
        fields: &[
            ("host", "localhost"),
            ("port", "8080"),
            ("catalog", "hive"),
            ("schema", "default"),
        ],
    },
];

/// Adapter kinds in alphabetical order
pub fn supported() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|entry| entry.kind)
}

/// Canonical form of a user-supplied adapter kind
pub fn normalize(kind: &str) -> String {
    kind.trim().to_lowercase()
}

pub fn is_supported(kind: &str) -> bool {
    lookup(kind).is_some()
}

fn lookup(kind: &str) -> Option<&'static AdapterTemplate> {
    let kind = normalize(kind);
    CATALOG.iter().find(|entry| entry.kind == kind)
}

/// Render the manifest entry for a new datasource, or `None` for an unknown
/// adapter.
pub fn template(kind: &str, ds_key: &str) -> Option<String> {
    let entry = lookup(kind)?;

    let mut block = format!("{}:\n", ds_key);
    block.push_str(&format!("  adapter: {}\n", entry.kind));
    block.push_str(&format!("  name: {}\n", NAME_PLACEHOLDER));
    for (field, value) in entry.fields {
        block.push_str(&format!("  {}: {}\n", field, value));
    }
    Some(block)
}

/// Lowercase, trim, turn whitespace runs into `-` and drop anything that is
/// not a word character or `-`.
pub fn url_safe_str(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
