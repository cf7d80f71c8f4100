//! HTML views
//!
//! Pages are plain strings assembled with `format!`; every piece of user or
//! file supplied text goes through [`escape_html`].

use interest_predictor::{
    BatchReport, ClassLabel, ModelSummary, PredictionResult, AGE_MAX, AGE_MIN,
};
use std::fmt::Write as _;

const STYLE: &str = r#"
        :root { --primary: #6366f1; --secondary: #8b5cf6; --accent: #10b981; --text: #1e293b; }
        body { font-family: -apple-system, "Segoe UI", Arial, sans-serif; background: #f8fafc;
               color: var(--text); max-width: 760px; margin: 40px auto; padding: 0 20px; }
        .header { text-align: center; padding: 2rem 1rem; border-radius: 16px; margin-bottom: 2rem;
                  background: linear-gradient(135deg, var(--primary), var(--secondary)); color: white; }
        .header h1 { margin: 0; font-size: 2rem; }
        .header p { margin: 0.5rem 0 0 0; opacity: 0.9; }
        .card { background: white; padding: 2rem; border-radius: 16px; margin-bottom: 1.5rem;
                box-shadow: 0 2px 12px rgba(0,0,0,0.08); }
        .result { text-align: center; color: white;
                  background: linear-gradient(135deg, var(--primary), var(--secondary)); }
        .result .emoji { font-size: 4rem; }
        .result .label { font-size: 2.5rem; font-weight: 700; margin: 0; }
        .error { background: #fef2f2; border: 1px solid #fecaca; color: #dc2626;
                 padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
        .bar { background: #e2e8f0; border-radius: 6px; height: 18px; margin: 4px 0 12px 0; }
        .bar span { display: block; height: 100%; border-radius: 6px; background: var(--primary); }
        .result .bar { background: rgba(255,255,255,0.25); }
        .result .bar span { background: white; }
        button { width: 100%; padding: 1rem; font-size: 1.1rem; font-weight: 700; color: white; border: none;
                 border-radius: 12px; cursor: pointer;
                 background: linear-gradient(135deg, var(--primary), var(--secondary)); }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #e2e8f0; }
        pre { background: #f1f5f9; padding: 1rem; border-radius: 8px; overflow-x: auto; }
        nav { text-align: center; margin-bottom: 1rem; }
        nav a { color: var(--primary); margin: 0 0.75rem; }
        footer { text-align: center; color: #94a3b8; font-size: 0.85rem; padding: 2rem 1rem; }
"#;

/// Values echoed back into the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub age: String,
    pub gender: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            age: "25".to_string(),
            gender: "female".to_string(),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="header">
        <h1>🎯 Interest Predictor</h1>
        <p>Decision tree prediction of Animation, Action or Drama from age and gender</p>
    </div>
    <nav><a href="/">Predict</a><a href="/batch">Batch</a><a href="/model">Model</a></nav>
{body}
    <footer>interest-dashboard v{version}</footer>
</body>
</html>
"#,
        title = escape_html(title),
        version = env!("CARGO_PKG_VERSION"),
    )
}

fn form_card(form: &FormValues, error: Option<&str>) -> String {
    let mut body = String::from(r#"    <div class="card">"#);
    body.push_str("\n        <h3>📝 Enter your information</h3>\n");
    if let Some(message) = error {
        let _ = writeln!(
            body,
            r#"        <div class="error"><strong>⚠️ Invalid input</strong><br>{}</div>"#,
            escape_html(message)
        );
    }
    let checked = |value: &str| {
        if form.gender.eq_ignore_ascii_case(value) {
            " checked"
        } else {
            ""
        }
    };
    let _ = write!(
        body,
        r#"        <form method="post" action="/predict">
            <label for="age">What is your age?</label>
            <input type="range" id="age" name="age" min="{AGE_MIN}" max="{AGE_MAX}" step="1" value="{age}"
                   oninput="document.getElementById('age-display').textContent = this.value + ' years'">
            <p id="age-display">{age} years</p>
            <p>What is your gender?</p>
            <label><input type="radio" name="gender" value="female"{female}> 👩 Female</label>
            <label><input type="radio" name="gender" value="male"{male}> 👨 Male</label>
            <p><button type="submit">🔮 Predict my interest</button></p>
        </form>
    </div>
"#,
        age = escape_html(&form.age),
        female = checked("female"),
        male = checked("male"),
    );
    body
}

fn probability_bars(result: &PredictionResult) -> String {
    let mut out = String::new();
    for (label, p) in result.ranked() {
        let _ = writeln!(
            out,
            r#"        <div>{} {} {:.1}%</div><div class="bar"><span style="width: {:.1}%"></span></div>"#,
            label.emoji(),
            label,
            p * 100.0,
            p * 100.0
        );
    }
    out
}

pub fn index_page(form: &FormValues, error: Option<&str>) -> String {
    page("Interest Predictor", &form_card(form, error))
}

pub fn result_page(form: &FormValues, result: &PredictionResult) -> String {
    let mut body = form_card(form, None);
    let _ = write!(
        body,
        r#"    <div class="card result">
        <div class="emoji">{emoji}</div>
        <div>Your predicted interest is</div>
        <p class="label">{label}</p>
        <p>Confidence: {confidence:.1}%</p>
{bars}    </div>
"#,
        emoji = result.label.emoji(),
        label = result.label,
        confidence = result.confidence() * 100.0,
        bars = probability_bars(result),
    );
    page("Interest Predictor", &body)
}

pub fn batch_page(source: &str, report: &BatchReport) -> String {
    let stats = report.stats();
    let accuracy = stats
        .accuracy
        .map(|a| format!("{:.1}%", a * 100.0))
        .unwrap_or_else(|| "n/a".to_string());

    let mut body = String::new();
    let _ = write!(
        body,
        r#"    <div class="card">
        <h3>📊 Batch predictions</h3>
        <p>Source: <code>{source}</code></p>
        <p>{total} rows, {succeeded} predicted, {failed} failed, accuracy {accuracy}</p>
        <table>
            <tr><th>Row</th><th>Age</th><th>Gender</th><th>Prediction</th><th>Confidence</th><th>Actual</th></tr>
"#,
        source = escape_html(source),
        total = stats.total,
        succeeded = stats.succeeded,
        failed = stats.failed,
    );

    for entry in &report.entries {
        let (age, gender) = entry
            .input
            .map(|v| (v.age.to_string(), v.gender.to_string()))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        let actual = entry
            .expected
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        match &entry.outcome {
            Ok(prediction) => {
                let mark = match entry.is_correct() {
                    Some(true) => " ✅",
                    Some(false) => " ❌",
                    None => "",
                };
                let _ = writeln!(
                    body,
                    "            <tr><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td><td>{:.1}%</td><td>{}{}</td></tr>",
                    entry.row,
                    age,
                    gender,
                    prediction.label.emoji(),
                    prediction.label,
                    prediction.confidence() * 100.0,
                    actual,
                    mark
                );
            }
            Err(err) => {
                let _ = writeln!(
                    body,
                    r#"            <tr><td>{}</td><td colspan="5" class="error">{}</td></tr>"#,
                    entry.row,
                    escape_html(&err.to_string())
                );
            }
        }
    }
    body.push_str("        </table>\n    </div>\n");
    page("Batch predictions", &body)
}

pub fn message_page(title: &str, message: &str) -> String {
    let body = format!(
        r#"    <div class="card"><div class="error"><strong>⚠️ {}</strong><br>{}</div></div>
"#,
        escape_html(title),
        escape_html(message)
    );
    page(title, &body)
}

pub fn model_page(summary: &ModelSummary, tree_text: &str) -> String {
    let mut importances = String::new();
    for (rank, item) in summary.feature_importances.iter().enumerate() {
        let _ = writeln!(
            importances,
            r#"        <div>{}. {} {:.3}</div><div class="bar"><span style="width: {:.1}%"></span></div>"#,
            rank + 1,
            escape_html(&item.feature),
            item.importance,
            item.importance * 100.0
        );
    }

    let classes = summary
        .classes
        .iter()
        .map(|c: &ClassLabel| format!("{} {}", c.emoji(), c))
        .collect::<Vec<_>>()
        .join(", ");

    let body = format!(
        r#"    <div class="card">
        <h3>🌳 Model</h3>
        <p>Depth {depth}, {leaves} leaves, {nodes} nodes</p>
        <p>Classes: {classes}</p>
        <p>Fingerprint: <code>{fingerprint}</code></p>
    </div>
    <div class="card">
        <h3>Feature importance</h3>
{importances}    </div>
    <div class="card">
        <h3>Tree structure</h3>
        <pre>{tree}</pre>
    </div>
"#,
        depth = summary.depth,
        leaves = summary.leaf_count,
        nodes = summary.node_count,
        fingerprint = escape_html(&summary.fingerprint),
        tree = escape_html(tree_text),
    );
    page("Model diagnostics", &body)
}
