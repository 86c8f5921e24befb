use axum::response::Html;

const UPLOAD_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>ResumeLens</title>
  <style>
    body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; max-width: 720px; margin: 3rem auto; }
    h1 { color: #1E3A8A; font-size: 3rem; margin-bottom: 0; text-align: center; }
    p.subtitle { text-align: center; font-size: 1.1rem; }
    #status { margin-top: 1.5rem; white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>ResumeLens</h1>
  <p class="subtitle">Automated AI Extraction &amp; CSV Intelligence</p>
  <form id="upload">
    <input type="file" name="files" accept=".zip,.pdf,.docx" multiple>
    <button type="submit">Analyze</button>
  </form>
  <div id="status">Upload resumes to begin</div>
  <script>
    const statusBox = document.getElementById('status');
    async function poll(id) {
      const res = await fetch(`/api/v1/batches/${id}`);
      const report = await res.json();
      statusBox.textContent = report.message;
      if (report.status === 'processing') {
        setTimeout(() => poll(id), 1500);
      } else if (report.download_url) {
        const link = document.createElement('a');
        link.href = report.download_url;
        link.textContent = 'Download Resume Intelligence CSV';
        statusBox.append('\n', link);
      }
    }
    document.getElementById('upload').addEventListener('submit', async (event) => {
      event.preventDefault();
      const res = await fetch('/api/v1/batches', { method: 'POST', body: new FormData(event.target) });
      const report = await res.json();
      statusBox.textContent = report.message || (report.error && report.error.message);
      if (report.batch_id) poll(report.batch_id);
    });
  </script>
</body>
</html>
"#;

/// GET /
/// Minimal upload page driving the batch API.
pub async fn upload_page() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}
