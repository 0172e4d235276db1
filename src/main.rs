//! # Placard CLI
//!
//! Usage:
//!   placard chart.json -o board.png
//!   echo '{ ... }' | placard -o board.png
//!   placard --example > timetable.json
//!   placard chart.json --verbose debug
//!
//! On failure the operation log and the error go to stderr, in the same
//! form an HTTP handler would serve them.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use placard::{render_json, RenderOutcome, Response};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_timetable_json());
        return;
    }

    let level = flag_value(&args, "--verbose")
        .map(|v| v.parse::<LevelFilter>().unwrap_or(LevelFilter::Debug))
        .unwrap_or(LevelFilter::Warn);
    // A second logger can't be installed; the first one wins.
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).unwrap_or_else(|e| fail(&format!("cannot read '{}': {}", args[1], e)))
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            fail(&format!("cannot read stdin: {}", e));
        }
        buf
    };

    let output_path = flag_value(&args, "-o").unwrap_or_else(|| "output.png".to_string());

    match render_json(&input) {
        RenderOutcome::Rendered {
            png, width, height, ..
        } => {
            if let Err(e) = fs::write(&output_path, &png) {
                fail(&format!("cannot write '{}': {}", output_path, e));
            }
            eprintln!(
                "✓ Written {}x{} image ({} bytes) to {}",
                width,
                height,
                png.len(),
                output_path
            );
        }
        failed @ RenderOutcome::Failed { .. } => {
            let response = Response::from_outcome(failed);
            eprint!("{}", String::from_utf8_lossy(&response.body));
            process::exit(1);
        }
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

fn example_timetable_json() -> &'static str {
    r##"{
  "chart": {
    "type": "Table",
    "groups": [
      {
        "header": "Eindhoven, HTC/Berkenbos",
        "records": [
          { "time": "13:42", "secondary": "407", "label": "Eindhoven Station" },
          { "time": "13:49 +3", "secondary": "20", "label": "Best via Airport", "delayed": true },
          { "time": "14:12", "secondary": "407", "label": "Eindhoven Station" }
        ]
      },
      {
        "header": "Eindhoven, HTC/Zuid",
        "records": []
      }
    ],
    "style": {
      "headerFont": { "family": "Block", "size": 44 },
      "cellFont": { "family": "Block", "size": 36 },
      "footer": {
        "font": { "family": "Block", "size": 16 },
        "color": "#46555f",
        "inset": 45,
        "timestampFormat": "%H:%M:%S",
        "timestampSide": "Right"
      }
    }
  },
  "lowlight": "Airport",
  "note": "v0.ovapi.nl"
}
"##
}
