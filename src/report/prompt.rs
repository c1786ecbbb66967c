//! Report prompt template

use crate::charts::{BAR_FILE, GAUGE_FILE, PIE_FILE, SCATTER_FILE};
use crate::config::GaugeConfig;

/// Report title the model is asked to use.
pub const REPORT_TITLE: &str = "Equipment Maintenance Analysis Report";

/// One analysis section of the requested report.
struct Section {
    heading: &'static str,
    purpose: String,
    questions: &'static [&'static str],
    image: &'static str,
    request: &'static str,
}

fn sections(gauge: &GaugeConfig) -> [Section; 4] {
    [
        Section {
            heading: "1. Elapsed Time by Maintenance Status (Bar Chart)",
            purpose: "Understand how cumulative operating time splits between normal running \
                      and maintenance-required states, and how it is distributed across failure types"
                .to_string(),
            questions: &[
                "Which failure type occurs most often?",
                "How long is the maintenance-required time compared with normal operation?",
                "How long did the maintenance-required state last?",
                "How concentrated is a particular failure?",
            ],
            image: BAR_FILE,
            request: "Interpret the chart and explain the share of time spent in normal versus \
                      failure states and the time consumed by each failure type.",
        },
        Section {
            heading: "2. Maintenance Status and Failure Type Ratio (Pie Chart)",
            purpose: "Understand the relative share of maintenance-required readings and of each failure type"
                .to_string(),
            questions: &[
                "How many of the readings show an actual failure?",
                "Which failure type occurs most often?",
                "Which failure type has been most frequent recently?",
            ],
            image: PIE_FILE,
            request: "Interpret the maintenance-required ratio against the normal state and the \
                      distribution of the actual failure types within it.",
        },
        Section {
            heading: "3. Predicted Remaining Life (Gauge)",
            purpose: format!(
                "Decide when to replace or service the equipment based on its predicted remaining life \
                 (range 0 to {:.0}; {:.0} or below is considered critical)",
                gauge.max_value, gauge.critical_threshold
            ),
            questions: &[
                "Should this equipment be serviced now?",
                "Is the predicted life at a critical level?",
                "Have recent sensor values affected the remaining life?",
            ],
            image: GAUGE_FILE,
            request: "Interpret the remaining life value, compare it with the reference range, and \
                      state whether action is needed.",
        },
        Section {
            heading: "4. Maintenance Events Over Time (Scatter Plot)",
            purpose: "Identify when failures occurred over time and trends in failure types".to_string(),
            questions: &[
                "When were failures most recently clustered?",
                "Are there recurring failure types?",
            ],
            image: SCATTER_FILE,
            request: "Interpret how maintenance-required events are distributed over time, recurring \
                      failure patterns, and periods of concentrated maintenance.",
        },
    ]
}

/// Where the report's chart images live and what language to write in.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// Chart directory relative to the report file
    pub image_dir: &'a str,
    pub language: &'a str,
}

impl PromptContext<'_> {
    fn image(&self, file: &str) -> String {
        format!("{}/{file}", self.image_dir)
    }
}

/// Build the full prompt around the pretty-printed report JSON.
pub fn build_prompt(report_json: &str, gauge: &GaugeConfig, ctx: &PromptContext<'_>) -> String {
    let mut parts = Vec::new();

    parts.push(
        "### Analysis Overview\n\
         Using the operating history of the selected equipment (maintenance status, failure types and \
         predicted remaining life), write a markdown report that plant operators can act on. Each \
         visualization supports real maintenance decisions and preventive action."
            .to_string(),
    );

    parts.push(format!(
        "# Source data for the report (JSON)\n{report_json}"
    ));

    parts.push(format!(
        "Each visualization is attached as the image file below.\n\n\
         1. **Elapsed Time by Maintenance Status (min)**: {}\n\
         2. **Maintenance Status and Failure Type Ratio**: {}\n\
         3. **Predicted Remaining Life Gauge**: {}\n\
         4. **Maintenance Over Time Scatter Plot**: {}",
        ctx.image(BAR_FILE),
        ctx.image(PIE_FILE),
        ctx.image(GAUGE_FILE),
        ctx.image(SCATTER_FILE)
    ));

    parts.push(format!(
        "Report title: {REPORT_TITLE}\n\n\
         Place these three lines directly below the report title:\n\
         **Equipment:** machine\n\
         **Date range:** date\n\
         **Time range:** time (HH:MM)"
    ));

    for section in sections(gauge) {
        let questions = section
            .questions
            .iter()
            .map(|q| format!("\"{q}\""))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!(
            "### {}\n\
             - **Analysis purpose:** {}\n\
             - **Example operator questions:** {}\n\
             - ![]({})\n\
             - **Request:** {}",
            section.heading,
            section.purpose,
            questions,
            ctx.image(section.image),
            section.request
        ));
    }

    parts.push(format!(
        "### Report Writing Conditions\n\
         - For each chart include a **visual interpretation (6 to 8 sentences)**, **overall insights \
         (at least 5 sentences)** and **operational improvement suggestions (at least 3)**\n\
         - Write the report as a **markdown document in {}**\n\
         - Use **direct, practical wording** so operators can act immediately\n\
         - Insert the four visualizations above at suitable places using markdown image syntax\n\
         - Only answer the example operator questions above in the report\n\
         - Do not wrap the output in a ```markdown``` fence; write markdown directly",
        ctx.language
    ));

    parts.join("\n\n---\n\n")
}
