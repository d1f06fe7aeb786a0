use std::path::Path;

const CIRCOS_DIR: &str = "circos";

const CONFIG_FILES: [&str; 6] = [
    "circos.conf",
    "ticks.conf",
    "ideogram.conf",
    "ideogram.label.conf",
    "ideogram.position.conf",
    "bands.conf",
];

const TRACK_CODES: [&str; 4] = ["Nex", "Ntr", "Tex", "Ttr"];

fn main() {
    let dir = Path::new(CIRCOS_DIR);
    for name in CONFIG_FILES {
        validate_config_file(&dir.join(name));
    }
    validate_track_references(&dir.join("circos.conf"));
    validate_local_includes(dir);
    set_build_dependencies();
}

fn read_config(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        panic!(
            "\n\nCIRCOS CONFIG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            path.display()
        );
    })
}

fn validate_config_file(path: &Path) {
    // Embedded with include_str!, so it must exist at build time
    assert!(
        path.exists(),
        "\n\nCIRCOS CONFIG BUILD ERROR: File not found\n\
         Path: {}\n",
        path.display()
    );

    let contents = read_config(path);
    assert!(
        !contents.trim().is_empty(),
        "\n\nCIRCOS CONFIG BUILD ERROR: File is empty\n\
         Path: {}\n",
        path.display()
    );
}

fn validate_track_references(main_config: &Path) {
    let contents = read_config(main_config);
    for code in TRACK_CODES {
        let reference = format!("conf(sample_name)_{code}.txt");
        assert!(
            contents.contains(&reference),
            "\n\nCIRCOS CONFIG BUILD ERROR: Missing track reference\n\
             Path: {}\n\
             Expected: {reference}\n\
             Hint: track files are written as <sample_name>_{code}.txt.\n",
            main_config.display()
        );
    }
}

/// Includes without a directory component must be shipped alongside
/// circos.conf; `etc/...` and the colour defaults come from the circos install.
fn validate_local_includes(dir: &Path) {
    let mut checked = 0;
    for name in CONFIG_FILES {
        let contents = read_config(&dir.join(name));
        for line in contents.lines() {
            let Some(target) = line
                .trim()
                .strip_prefix("<<include ")
                .and_then(|rest| rest.strip_suffix(">>"))
            else {
                continue;
            };
            let target = target.trim();
            if target.contains('/') || target == "colors_fonts_patterns.conf" {
                continue;
            }
            assert!(
                CONFIG_FILES.contains(&target),
                "\n\nCIRCOS CONFIG BUILD ERROR: Unknown include\n\
                 File: {name}\n\
                 Include: {target}\n"
            );
            checked += 1;
        }
    }

    println!("cargo:warning=Validated circos configuration: {checked} local includes");
}

fn set_build_dependencies() {
    for name in CONFIG_FILES {
        println!("cargo:rerun-if-changed={CIRCOS_DIR}/{name}");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
