//! Derived per-row fields consumed by the workflow (JVM args, test tags,
//! deploy flags).
//!
//! Runs after the row set is final and sorted. The stress-JIT coin flip
//! draws from the same random stream as generation, one draw per HotSpot
//! row, so the output stays reproducible from the seed.

use crate::profile::EA_JAVA;
use matrix_core::{compare_versions, RandomSource, Row};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Turns a generated row into the flat JSON object the workflow reads.
pub fn enrich_row(row: &Row, rng: &mut RandomSource) -> Map<String, Value> {
    let mut out = row.to_json();
    let mut name = row.name().to_string();

    let distribution = row.token("java_distribution");
    let java = row.token("java_version");
    let locale = row.get("locale");
    let country = locale.and_then(|l| l.attr("country")).unwrap_or_default();
    let language = locale.and_then(|l| l.attr("language")).unwrap_or_default();
    let locale_args = [
        format!("-Duser.country={}", country),
        format!("-Duser.language={}", language),
    ];

    if let Some(vendor) = row.get("java_distribution").and_then(|d| d.attr("vendor")) {
        out.insert("java_vendor".into(), vendor.into());
    }
    if distribution == "oracle" {
        let site = if java == EA_JAVA { "jdk.java.net" } else { "oracle.com" };
        out.insert("oracle_java_website".into(), site.into());
    }
    let non_ea = if java == EA_JAVA { "" } else { java };
    out.insert("non_ea_java_version".into(), non_ea.into());

    out.insert("extraGradleArgs".into(), locale_args.join(" ").into());

    // JUnit 5 tag expression; none() selects untagged tests
    let mut tags = vec!["none()"];
    if row.token("replication") == "yes" {
        tags.push("replication");
    }
    if row.token("slow_tests") == "yes" {
        tags.push("org.postgresql.test.SlowTests");
    }
    if row.token("xa") == "yes" {
        tags.push("xa");
    }
    out.insert("includeTestTags".into(), tags.join(" | ").into());

    if row.token("gss") == "yes" || row.token("check_anorm_sbt") == "yes" {
        out.insert("deploy_to_maven_local".into(), true.into());
    }

    let mut test_jvm_args: Vec<&str> = Vec::new();
    if row.token("hash") == "same" {
        // javac and kotlinc break with hashCode=2, so only tests get it
        test_jvm_args.extend(["-XX:+UnlockExperimentalVMOptions", "-XX:hashCode=2"]);
    }
    test_jvm_args.push("-Djava.security.egd=file:/dev/./urandom");

    // Gradle breaks under tr_TR, so the locale goes to the JVM options only
    let mut jvm_args: Vec<String> = locale_args.to_vec();
    let hotspot = distribution != "semeru";
    if hotspot && rng.random() > 0.5 {
        // Randomized C2 scheduling shakes out missing synchronization
        name.push_str(", stress JIT");
        jvm_args.push("-XX:+UnlockDiagnosticVMOptions".into());
        jvm_args.push("-XX:+StressGCM".into());
        jvm_args.push("-XX:+StressLCM".into());
        if compare_versions(java, "16") != Ordering::Less {
            jvm_args.push("-XX:+StressIGVN".into());
        }
        if compare_versions(java, "17") != Ordering::Less {
            jvm_args.push("-XX:+StressCCP".into());
        }
    }

    out.insert("extraJvmArgs".into(), jvm_args.join(" ").into());
    out.insert("testExtraJvmArgs".into(), test_jvm_args.join(" ::: ").into());
    out.insert("name".into(), name.into());
    out.remove("hash");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::PgjdbcProfile;
    use matrix_core::{MatrixBuilder, Selector};

    fn forced(seed: u64, selector: Selector) -> (Row, RandomSource) {
        let mut m = MatrixBuilder::seeded(seed);
        PgjdbcProfile::default().define(&mut m).unwrap();
        m.generate_row(&selector).unwrap().unwrap();
        let finished = m.finish().unwrap();
        (finished.rows[0].clone(), finished.rng)
    }

    #[test]
    fn test_ea_oracle_fields() {
        let (row, mut rng) = forced(1, Selector::new().eq("java_version", EA_JAVA));
        let out = enrich_row(&row, &mut rng);
        assert_eq!(out["java_distribution"], "oracle");
        assert_eq!(out["java_vendor"], "oracle");
        assert_eq!(out["oracle_java_website"], "jdk.java.net");
        assert_eq!(out["non_ea_java_version"], "");
    }

    #[test]
    fn test_non_oracle_has_no_website() {
        let (row, mut rng) = forced(
            1,
            Selector::new().eq("java_distribution", "zulu").eq("java_version", "8"),
        );
        let out = enrich_row(&row, &mut rng);
        assert!(!out.contains_key("oracle_java_website"));
        assert_eq!(out["java_vendor"], "azul");
        assert_eq!(out["non_ea_java_version"], "8");
    }

    #[test]
    fn test_same_hash_test_args_and_hash_removed() {
        let (row, mut rng) = forced(3, Selector::new().eq("hash", "same"));
        let out = enrich_row(&row, &mut rng);
        assert_eq!(
            out["testExtraJvmArgs"],
            "-XX:+UnlockExperimentalVMOptions ::: -XX:hashCode=2 ::: -Djava.security.egd=file:/dev/./urandom"
        );
        assert!(!out.contains_key("hash"));
        assert!(out["name"].as_str().unwrap().contains("same hashcode"));
    }

    #[test]
    fn test_tags_and_deploy() {
        let (row, mut rng) = forced(
            5,
            Selector::new()
                .eq("replication", "yes")
                .eq("slow_tests", "yes")
                .eq("xa", "yes")
                .eq("gss", "yes"),
        );
        let out = enrich_row(&row, &mut rng);
        assert_eq!(
            out["includeTestTags"],
            "none() | replication | org.postgresql.test.SlowTests | xa"
        );
        assert_eq!(out["deploy_to_maven_local"], true);

        let (row, mut rng) = forced(5, Selector::new().eq("gss", "no").eq("xa", "no").eq("replication", "no").eq("slow_tests", "no"));
        let out = enrich_row(&row, &mut rng);
        assert_eq!(out["includeTestTags"], "none()");
        assert!(!out.contains_key("deploy_to_maven_local"));
    }

    #[test]
    fn test_locale_args() {
        let (row, mut rng) = forced(7, Selector::new().eq("locale", "tr_TR"));
        let out = enrich_row(&row, &mut rng);
        assert_eq!(out["extraGradleArgs"], "-Duser.country=TR -Duser.language=tr");
        assert!(out["extraJvmArgs"]
            .as_str()
            .unwrap()
            .starts_with("-Duser.country=TR -Duser.language=tr"));
    }

    #[test]
    fn test_stress_jit_is_consistent_with_name() {
        for seed in 0..32 {
            let (row, mut rng) = forced(
                seed,
                Selector::new().eq("java_distribution", "temurin").eq("java_version", "17"),
            );
            let out = enrich_row(&row, &mut rng);
            let name = out["name"].as_str().unwrap();
            let args = out["extraJvmArgs"].as_str().unwrap();
            if name.ends_with(", stress JIT") {
                assert!(args.contains("-XX:+StressGCM"));
                assert!(args.contains("-XX:+StressIGVN"));
                assert!(args.contains("-XX:+StressCCP"));
            } else {
                assert!(!args.contains("Stress"));
            }
        }
    }

    #[test]
    fn test_stress_jit_java8_flags() {
        // Find a seed whose coin flip enables stress mode
        let out = (0..64)
            .map(|seed| {
                let (row, mut rng) = forced(
                    seed,
                    Selector::new().eq("java_distribution", "zulu").eq("java_version", "8"),
                );
                enrich_row(&row, &mut rng)
            })
            .find(|out| out["name"].as_str().unwrap().ends_with(", stress JIT"))
            .expect("a coin flip lands on stress mode within 64 seeds");
        let args = out["extraJvmArgs"].as_str().unwrap();
        assert!(args.contains("-XX:+StressLCM"));
        assert!(!args.contains("StressIGVN"));
        assert!(!args.contains("StressCCP"));
    }
}
