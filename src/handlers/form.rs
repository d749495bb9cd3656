//! Interactive form page
//!
//! Single HTML page driving the session API from the browser

use crate::handlers::AppState;
use crate::models::{CategorySet, DataType, Difficulty};
use crate::services::generator::MAX_QUESTIONS;
use axum::{extract::State, response::Html};
use std::sync::Arc;

const PAGE_SCRIPT: &str = r#"
let sessionId = null;
const $ = (id) => document.getElementById(id);
const show = (value) => { $('output').textContent = typeof value === 'string' ? value : JSON.stringify(value, null, 2); };

async function call(method, path, body) {
  const options = { method, headers: {} };
  if (body instanceof FormData) { options.body = body; }
  else if (body !== undefined) { options.headers['Content-Type'] = 'application/json'; options.body = JSON.stringify(body); }
  const response = await fetch(path, options);
  const data = await response.json();
  if (!response.ok) { throw new Error(data.error ? data.error.message : response.statusText); }
  return data;
}

function readForm() {
  const categories = {};
  document.querySelectorAll('[data-category]').forEach((el) => {
    if (el.value !== '') { categories[el.dataset.category] = el.value; }
  });
  return {
    categories,
    reference_mode: $('reference_mode').checked,
    num_questions: Number($('num_questions').value),
  };
}

async function ensureSession() {
  if (!sessionId) { sessionId = (await call('POST', '/api/sessions')).id; }
  return sessionId;
}

async function saveForm() {
  const id = await ensureSession();
  const status = await call('PUT', `/api/sessions/${id}/form`, readForm());
  $('estimate').textContent = `Estimated cost: $${status.estimate.estimated_usd.toFixed(4)}`;
  if (!status.ready) { throw new Error('Please fill in all categories: ' + status.missing.join(', ')); }
}

async function uploadDocument() {
  const file = $('document').files[0];
  if (!file) { return; }
  const id = await ensureSession();
  const form = new FormData();
  form.append('file', file);
  const view = await call('POST', `/api/sessions/${id}/document`, form);
  show(view.preview);
}

async function generateQuestions() {
  try {
    await saveForm();
    const result = await call('POST', `/api/sessions/${sessionId}/questions`);
    $('status').textContent = result.status_message;
    show(result.questions.join('\n'));
  } catch (e) { show(e.message); }
}

async function generateAnswers() {
  // EventSource drops the body of a rejected request
  try {
    await saveForm();
    const session = await call('GET', `/api/sessions/${sessionId}`);
    if (!session.questions.length) { throw new Error('Generate questions before answers'); }
  } catch (e) { show(e.message); return; }
  const source = new EventSource(`/api/sessions/${sessionId}/answers/stream`);
  source.addEventListener('progress', (e) => {
    const p = JSON.parse(e.data);
    $('progress').value = p.index / p.total;
    $('status').textContent = `Generating answer for question ${p.index}/${p.total}...`;
  });
  source.addEventListener('done', (e) => {
    source.close();
    const result = JSON.parse(e.data);
    $('status').textContent = `✅ All answers generated (${result.failed} failed)`;
    $('download').href = `/api/sessions/${sessionId}/export`;
    $('download').hidden = false;
    show(result.records);
  });
  source.addEventListener('error', (e) => {
    source.close();
    show(e.data ? JSON.parse(e.data).error.message : 'Answer stream interrupted');
  });
}

$('document').addEventListener('change', () => uploadDocument().catch((e) => show(e.message)));
$('num_questions').addEventListener('change', () => saveForm().catch(() => {}));
"#;

fn options<'a>(values: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut html = String::from("<option value=\"\">--</option>");
    for (value, label) in values {
        html.push_str(&format!("<option value=\"{}\">{}</option>", value, label));
    }
    html
}

/// Render the form
fn render_page(default_questions: u8) -> String {
    let text_fields = [
        ("core_capability", CategorySet::KEYS[0]),
        ("domain", CategorySet::KEYS[1]),
        ("theme", CategorySet::KEYS[2]),
        ("scenario", CategorySet::KEYS[3]),
        ("strategy", CategorySet::KEYS[5]),
    ];

    let mut fields = String::new();
    for (name, label) in text_fields {
        fields.push_str(&format!(
            "<label>{}<input data-category=\"{}\" type=\"text\"></label>\n",
            label, name
        ));
    }

    // Unit variants serialize to their label
    let difficulty = options(Difficulty::ALL.iter().map(|d| (d.label(), d.label())));
    let data_type = options(DataType::ALL.iter().map(|d| (d.label(), d.label())));

    fields.push_str(&format!(
        "<label>{}<select data-category=\"difficulty\">{}</select></label>\n",
        CategorySet::KEYS[4],
        difficulty
    ));
    fields.push_str(&format!(
        "<label>{}<select data-category=\"data_type\">{}</select></label>\n",
        CategorySet::KEYS[6],
        data_type
    ));

    format!(
        r#"<!DOCTYPE html>
<html lang="ms">
<head>
<meta charset="utf-8">
<title>Islamic LLM Dataset Generator</title>
<style>
body {{ font-family: sans-serif; max-width: 60rem; margin: 2rem auto; }}
label {{ display: block; margin: 0.5rem 0; }}
input[type=text], select {{ display: block; width: 100%; }}
pre {{ background: #f4f4f4; padding: 1rem; white-space: pre-wrap; }}
</style>
</head>
<body>
<h1>Islamic LLM Dataset Generator</h1>
<fieldset>
<legend>Categories</legend>
{fields}</fieldset>
<label><input id="reference_mode" type="checkbox" checked> Reference mode</label>
<label>Number of questions<input id="num_questions" type="number" min="1" max="{max}" value="{default}"></label>
<label>Reference document (PDF, DOCX, TXT, XLSX)<input id="document" type="file" accept=".pdf,.docx,.txt,.xlsx,.xls,.ods"></label>
<p id="estimate"></p>
<button onclick="generateQuestions()">Generate questions</button>
<button onclick="generateAnswers()">Generate answers</button>
<p id="status"></p>
<progress id="progress" value="0" max="1"></progress>
<p><a id="download" hidden>Download CSV</a></p>
<pre id="output"></pre>
<script>{script}</script>
</body>
</html>
"#,
        fields = fields,
        max = MAX_QUESTIONS,
        default = default_questions,
        script = PAGE_SCRIPT,
    )
}

/// Form page
///
/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(state.settings.generation.default_questions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_lists_every_category() {
        let page = render_page(30);
        for key in CategorySet::KEYS {
            assert!(page.contains(key), "missing {}", key);
        }
        assert!(page.contains("value=\"30\""));
        assert!(page.contains("Pemahaman dasar dan system"));
    }

    #[test]
    fn test_answers_validate_form_before_streaming() {
        let start = PAGE_SCRIPT.find("async function generateAnswers()").unwrap();
        let body = &PAGE_SCRIPT[start..];
        let save = body.find("await saveForm()").unwrap();
        let stream = body.find("new EventSource").unwrap();

        assert!(save < stream);
        assert!(body[..stream].contains("Generate questions before answers"));
    }
}
