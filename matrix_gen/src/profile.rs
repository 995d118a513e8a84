//! The pgjdbc CI matrix: axes, constraints and coverage rows.
//!
//! The rarest features are forced first. Each forced row also fills every
//! other axis, so early rows often cover later goals (e.g. the newest Java)
//! for free, and the later requests collapse into "already covered".

use matrix_core::{compare_versions, Axis, AxisValue, ConfigError, MatrixBuilder, Selector, ValueMatcher};
use std::cmp::Ordering;

/// Early-access Java build; only available from Oracle's jdk.java.net.
pub const EA_JAVA: &str = "22";

/// Repository that has self-hosted runners.
pub const CANONICAL_REPOSITORY: &str = "pgjdbc/pgjdbc";

/// Axes whose titles form the row name, in order.
pub const NAME_PATTERN: &[&str] = &[
    "java_version",
    "java_distribution",
    "pg_version",
    "query_mode",
    "scram",
    "ssl",
    "hash",
    "os",
    "server_tz",
    "tz",
    "locale",
    "check_anorm_sbt",
    "gss",
    "replication",
    "slow_tests",
];

/// Matrix definition for the pgjdbc driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PgjdbcProfile {
    /// Adds the `self-hosted` OS value and its constraints
    pub self_hosted: bool,
}

impl PgjdbcProfile {
    /// Profile for the repository running the workflow.
    pub fn for_repository(repository: Option<&str>) -> Self {
        Self {
            self_hosted: repository == Some(CANONICAL_REPOSITORY),
        }
    }

    /// Registers axes, the name pattern and constraints.
    pub fn define(&self, m: &mut MatrixBuilder) -> Result<(), ConfigError> {
        self.define_axes(m)?;
        m.set_name_pattern(NAME_PATTERN)?;
        self.define_constraints(m)
    }

    fn define_axes(&self, m: &mut MatrixBuilder) -> Result<(), ConfigError> {
        m.add_axis(Axis::new(
            "java_distribution",
            [
                ("corretto", "amazon"),
                ("liberica", "bellsoft"),
                ("microsoft", "microsoft"),
                ("oracle", "oracle"),
                // Semeru fails with Gradle 8.5 (gradle/gradle#27273)
                ("temurin", "eclipse"),
                ("zulu", "azul"),
            ]
            .into_iter()
            .map(|(dist, vendor)| AxisValue::new(dist).with_attr("vendor", vendor)),
        ))?;

        m.add_axis(
            Axis::new("java_version", ["8", "11", "17", "21", EA_JAVA])
                .with_title(|v| format!("Java {}", v.token)),
        )?;

        m.add_axis(
            Axis::new(
                "pg_version",
                [
                    "8.4", "9.0", "9.1", "9.2", "9.3", "9.4", "9.5", "9.6", "10", "11", "12", "13", "14",
                ],
            )
            .with_title(|v| format!("PG {}", v.token)),
        )?;

        let zones = ["America/New_York", "Pacific/Chatham", "UTC"];
        m.add_axis(Axis::new("tz", zones).with_title(|v| format!("client_tz {}", v.token)))?;
        m.add_axis(Axis::new("server_tz", zones).with_title(|v| format!("server_tz {}", v.token)))?;

        // PostgreSQL runs in docker-compose, so windows/macos runners are off
        let mut os = vec!["ubuntu-latest"];
        if self.self_hosted {
            os.push("self-hosted");
        }
        m.add_axis(Axis::new("os", os).with_title(|v| v.token.replace("-latest", "")))?;

        // Identical Object#hashCode values catch code that treats hashes as ids
        m.add_axis(Axis::new(
            "hash",
            vec![
                AxisValue::new("regular").with_title("").with_weight(42.0),
                AxisValue::new("same").with_title("same hashcode"),
            ],
        ))?;

        m.add_axis(
            Axis::new(
                "locale",
                [("de", "DE"), ("fr", "FR"), ("ru", "RU"), ("tr", "TR")]
                    .into_iter()
                    .map(|(language, country)| {
                        AxisValue::new(format!("{}_{}", language, country))
                            .with_attr("language", language)
                            .with_attr("country", country)
                    }),
            )
            .with_title(|v| {
                format!(
                    "{}_{}",
                    v.attr("language").unwrap_or_default(),
                    v.attr("country").unwrap_or_default()
                )
            }),
        )?;

        m.add_axis(Axis::new(
            "query_mode",
            vec![
                AxisValue::new("simple").with_title("simple query").with_weight(2.0),
                AxisValue::new("extendedForPrepared").with_weight(2.0),
                AxisValue::new("extended").with_title("").with_weight(10.0),
                AxisValue::new("extendedCacheEverything").with_weight(2.0),
            ],
        ))?;

        m.add_axis(yes_no("replication", 10.0, 10.0))?;
        m.add_axis(yes_no("slow_tests", 1.0, 10.0))?;
        m.add_axis(yes_no("scram", 10.0, 10.0))?;
        m.add_axis(yes_no("ssl", 10.0, 10.0))?;
        m.add_axis(yes_no("gss", 2.0, 10.0))?;
        m.add_axis(yes_no("xa", 10.0, 10.0))?;

        // "yes" is disabled until pgjdbc/pgjdbc#2537 is resolved
        m.add_axis(Axis::new(
            "check_anorm_sbt",
            vec![AxisValue::new("no").with_title("").with_weight(10.0)],
        ))?;

        Ok(())
    }

    fn define_constraints(&self, m: &mut MatrixBuilder) -> Result<(), ConfigError> {
        // EA builds come from Oracle
        m.imply(
            Selector::new().eq("java_version", EA_JAVA),
            Selector::new().eq("java_distribution", "oracle"),
        )?;
        m.exclude(Selector::new().eq("ssl", "yes").with("pg_version", below("9.3")))?;
        m.exclude(Selector::new().eq("scram", "yes").with("pg_version", below("10")))?;
        m.exclude(Selector::new().eq("replication", "yes").with("pg_version", below("9.6")))?;
        // ArrayTest fails in simple mode before 9.1 (malformed array literal)
        m.exclude(Selector::new().eq("query_mode", "simple").with("pg_version", below("9.1")))?;
        // Microsoft ships Java 11+
        m.imply(
            Selector::new().eq("java_distribution", "microsoft"),
            Selector::new().with("java_version", ValueMatcher::version_at_least("11")),
        )?;
        // Oracle JDK is only supported for 17+
        m.imply(
            Selector::new().eq("java_distribution", "oracle"),
            Selector::new().matching("java_version", format!("{} or >= 17", EA_JAVA), |v| {
                v.is(EA_JAVA) || compare_versions(&v.token, "17") != Ordering::Less
            }),
        )?;
        m.exclude(
            Selector::new()
                .eq("gss", "yes")
                .any_of("os", ["windows-latest", "macos-latest", "self-hosted"]),
        )?;
        if self.self_hosted {
            // PG images below 9.3 are x86_64 only
            m.exclude(Selector::new().eq("os", "self-hosted").with("pg_version", below("9.3")))?;
        }
        Ok(())
    }

    /// Forced rows, rarest features first. Call after [`define`](Self::define).
    pub fn coverage(&self, m: &MatrixBuilder) -> Vec<Selector> {
        let java = tokens(m, "java_version");
        let pg = tokens(m, "pg_version");

        let mut rows = vec![
            Selector::new().eq("hash", "same"),
            Selector::new().eq("scram", "yes"),
            // Early so its other axes can pick up rare values like ssl=yes
            Selector::new().eq("java_version", EA_JAVA),
        ];
        rows.extend(pg.first().map(|v| Selector::new().eq("pg_version", v.as_str())));
        rows.extend(pg.last().map(|v| Selector::new().eq("pg_version", v.as_str())));
        rows.push(Selector::new().eq("query_mode", "simple"));
        rows.extend(java.first().map(|v| Selector::new().eq("java_version", v.as_str())));
        rows.push(Selector::new().eq("java_version", "17"));
        // Newest GA release: the value before EA
        if java.len() >= 2 {
            rows.push(Selector::new().eq("java_version", java[java.len() - 2].as_str()));
        }
        rows.push(Selector::new().eq("ssl", "yes"));
        rows.push(Selector::new().eq("os", "ubuntu-latest"));
        if self.self_hosted {
            rows.push(Selector::new().eq("os", "self-hosted"));
        }
        for axis in ["query_mode", "gss", "xa", "ssl", "replication"] {
            rows.extend(tokens(m, axis).into_iter().map(|t| Selector::new().eq(axis, t)));
        }
        rows
    }
}

fn yes_no(name: &'static str, yes: f64, no: f64) -> Axis {
    Axis::new(
        name,
        vec![
            AxisValue::new("yes").with_weight(yes),
            AxisValue::new("no").with_weight(no),
        ],
    )
    .with_title(move |v| {
        if v.is("yes") {
            name.to_string()
        } else {
            format!("no_{}", name)
        }
    })
}

fn below(version: &str) -> ValueMatcher {
    ValueMatcher::version_below(version)
}

fn tokens(m: &MatrixBuilder, axis: &str) -> Vec<String> {
    m.axis(axis)
        .map(|a| a.values().iter().map(|v| v.token.clone()).collect())
        .unwrap_or_default()
}
