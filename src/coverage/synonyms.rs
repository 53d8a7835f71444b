// Skill alias -> canonical form mapping.
//
// Requirement terms and extracted skills are both reduced to a canonical
// form before membership tests, so "k8s" in a resume satisfies a
// "kubernetes" requirement. Exact aliases only — fuzzy closeness is the
// similarity engine's job and has no place here.

use std::collections::HashMap;
use std::sync::LazyLock;

static ALIAS_TO_CANONICAL: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let aliases: &[(&str, &[&str])] = &[
        // Languages
        ("javascript", &["js", "ecmascript", "es6"]),
        ("typescript", &["ts"]),
        ("python", &["py", "python3", "python 3"]),
        ("go", &["golang"]),
        ("c#", &["csharp", "c sharp"]),
        ("c++", &["cpp", "cplusplus"]),
        // Runtime / frameworks
        ("nodejs", &["node", "node.js", "node js"]),
        ("react", &["reactjs", "react.js"]),
        ("nextjs", &["next.js", "next js"]),
        ("django", &["django rest framework", "drf"]),
        ("fastapi", &["fast api"]),
        ("spring", &["spring boot", "springboot"]),
        // Data stores
        ("postgresql", &["postgres", "pg"]),
        ("mysql", &["my sql", "mariadb"]),
        ("mongodb", &["mongo", "mongo db"]),
        ("elasticsearch", &["elastic search"]),
        ("sqlite", &["sqlite3"]),
        // Cloud & infra
        ("aws", &["amazon web services", "amazon aws"]),
        ("gcp", &["google cloud platform", "google cloud"]),
        ("azure", &["microsoft azure", "ms azure"]),
        ("kubernetes", &["k8s", "k8"]),
        ("docker", &["docker containers"]),
        ("terraform", &["tf", "infrastructure as code"]),
        ("ci/cd", &["cicd", "ci cd", "continuous integration"]),
        // ML & data
        ("machine learning", &["ml"]),
        ("deep learning", &["dl"]),
        ("nlp", &["natural language processing"]),
        ("tensorflow", &["tensor flow"]),
        ("pytorch", &["py torch"]),
        ("scikit-learn", &["sklearn", "scikit learn"]),
    ];

    let mut map = HashMap::new();
    for (canonical, alias_list) in aliases {
        map.insert(*canonical, *canonical);
        for alias in *alias_list {
            map.insert(*alias, *canonical);
        }
    }
    map
});

/// Reduce a skill or requirement term to its canonical form: trimmed,
/// lowercased, internal whitespace collapsed, aliases resolved.
pub fn canonical(term: &str) -> String {
    let normalized = term
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    match ALIAS_TO_CANONICAL.get(normalized.as_str()) {
        Some(canon) => (*canon).to_string(),
        None => normalized,
    }
}
