// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
 _       _          _
| | __ _| |__   ___| | ___ _ __
| |/ _` | '_ \ / _ \ |/ _ \ '__|
| | (_| | |_) |  __/ |  __/ |
|_|\__,_|_.__/ \___|_|\___|_|

    Manual Labeling & Classifier Evaluation
"#;
    println!("{}", banner);
}
