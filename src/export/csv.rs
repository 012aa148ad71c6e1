use crate::models::Lead;

/// Fixed column order for the lead export. Stable; downstream spreadsheets
/// key on it.
const COLUMNS: [&str; 10] = [
    "name",
    "phone",
    "category",
    "requirement",
    "location",
    "budget",
    "status",
    "follow_up",
    "notes",
    "created_at",
];

/// Render leads as CSV: a plain header row, then one row per lead with every
/// field double-quoted and embedded quotes doubled.
pub fn leads_to_csv(leads: &[Lead]) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    for lead in leads {
        out.push('\n');
        let notes = lead.joined_notes();
        let fields = [
            lead.name.as_str(),
            lead.phone.as_str(),
            lead.segment.as_deref().unwrap_or(""),
            lead.requirement.as_deref().unwrap_or(""),
            lead.location.as_deref().unwrap_or(""),
            lead.budget.as_deref().unwrap_or(""),
            lead.status.as_deref().unwrap_or(""),
            lead.next_follow.as_deref().unwrap_or(""),
            notes.as_str(),
            lead.created_at.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        out.push_str(&row.join(","));
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
