use crate::{
    export::{Context, export_with},
    record::ErrorRecord,
    templates::{TemplateSet, Vars, insert},
};

/// Everything a report template can show about one record.
pub(crate) struct Report<'a> {
    pub(crate) record: &'a ErrorRecord,
    pub(crate) id: &'a str,
    pub(crate) help_path: Option<&'a str>,
    pub(crate) code: &'a [String],
    pub(crate) context: &'a [String],
    pub(crate) trace: &'a str,
}

pub(crate) fn context_lines(context: &Context, budget: isize) -> Vec<String> {
    context
        .iter()
        .map(|(name, value)| format!("${name} = {}", export_with(value, budget)))
        .collect()
}

fn record_vars(record: &ErrorRecord) -> Vars<'_> {
    let mut vars = Vars::new();
    vars.set("error", record.severity.label())
        .set("level", record.priority.as_str())
        .set("code", record.code.to_string())
        .set("description", record.description.as_str())
        .set("file", record.file.as_str())
        .set("path", record.path.as_str())
        .set("line", record.line_text())
        .set("helpID", record.help_id.as_deref().unwrap_or_default());
    vars
}

/// Renders the single-line log form of a record.
pub(crate) fn render_log(template: &str, record: &ErrorRecord) -> String {
    insert(template, &record_vars(record))
}

/// Renders a full report with a resolved template set.
pub(crate) fn render(templates: &TemplateSet, report: &Report<'_>) -> String {
    let context = report.context.join("\n");
    let code = report.code.join("\n");

    let mut vars = record_vars(report.record);
    vars.set("id", report.id)
        .set("helpPath", report.help_path.unwrap_or_default())
        .set("context", context.as_str());

    let links: Vec<String> = templates
        .links
        .iter()
        .filter(|(name, _)| match name.as_str() {
            "help" => report.record.help_id.is_some(),
            "context" => !context.is_empty(),
            _ => true,
        })
        .map(|(_, template)| insert(template, &vars))
        .collect();

    let mut info = String::new();
    for (key, text, template) in [
        ("code", code.as_str(), templates.code.as_deref()),
        ("context", context.as_str(), templates.context.as_deref()),
        ("trace", report.trace, templates.trace.as_deref()),
    ] {
        let Some(template) = template else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        let mut section = vars.clone();
        section.set(key, text);
        info.push_str(&insert(template, &section));
    }

    if let Some(wrapper) = templates.info.as_deref().filter(|wrapper| !wrapper.is_empty()) {
        info = {
            let mut section = vars.clone();
            section.set("info", info.as_str());
            insert(wrapper, &section)
        };
    }

    vars.set("links", links.join(" | ")).set("info", info);
    insert(templates.error.as_deref().unwrap_or_default(), &vars)
}
