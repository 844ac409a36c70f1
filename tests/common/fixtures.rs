//! Test fixtures - archive layouts and recipes.

#![allow(dead_code)]

/// transwarp 1.2.1 kept its header in src/ next to the tests.
pub fn transwarp_1_2_1() -> Vec<(&'static str, &'static str)> {
    vec![
        ("transwarp-1.2.1/README.md", "# transwarp"),
        ("transwarp-1.2.1/src/transwarp.h", "// transwarp 1.2.1"),
        ("transwarp-1.2.1/src/test.h", "// test helpers"),
        ("transwarp-1.2.1/src/test.cpp", "int main() {}"),
    ]
}

/// transwarp 2.2.2 moved the header into include/.
pub fn transwarp_2_2_2() -> Vec<(&'static str, &'static str)> {
    vec![
        ("transwarp-2.2.2/README.md", "# transwarp"),
        ("transwarp-2.2.2/include/transwarp.h", "// transwarp 2.2.2"),
        ("transwarp-2.2.2/src/test.cpp", "int main() {}"),
    ]
}

/// Recipe mirroring recipes/transwarp.toml, pointed at a mock host.
pub fn transwarp_recipe(url: &str, version: &str) -> String {
    format!(
        r#"
name = "transwarp"
version = "{version}"
license = "MIT"
url = "{url}"

[stage]
pattern = "*.h"
dest = "include"

[[layout]]
versions = "<2.0.0"
path = "{{name}}-{{version}}/src"

[[layout]]
versions = ">=2.0.0"
path = "{{name}}-{{version}}/include"
"#
    )
}
