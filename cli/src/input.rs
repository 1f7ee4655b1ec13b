use anyhow::{Context, Result};
use lexq_core::DocumentInput;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "body")]
    text: String,
    /// Returned to callers as-is; falls back to `text`.
    #[serde(default)]
    content: Option<String>,
    #[serde(default, alias = "meta")]
    metadata: Option<serde_json::Value>,
}

impl From<InputDoc> for DocumentInput {
    fn from(doc: InputDoc) -> Self {
        let content = doc.content.unwrap_or_else(|| doc.text.clone());
        DocumentInput { id: doc.id, text: doc.text, content, metadata: doc.metadata }
    }
}

/// Load documents from a JSON / JSONL file, or every such file below a
/// directory (sorted by path so ingestion order is stable).
pub fn load_documents(input: &str) -> Result<Vec<DocumentInput>> {
    let input_path = Path::new(input);
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        anyhow::bail!("input path does not exist: {input}");
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<DocumentInput>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        docs.push(doc.into());
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<DocumentInput>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader).with_context(|| file.display().to_string())?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v)?;
                docs.push(doc.into());
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)?;
            docs.push(doc.into());
        }
        _ => tracing::warn!(file = %file.display(), "skipping JSON that is neither an object nor an array"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_json_and_jsonl_from_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"id": "1", "text": "store hours", "content": "nine to five"}, {"body": "refunds"}]"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.jsonl"), "{\"text\": \"shipping\", \"meta\": {\"lang\": \"en\"}}\n\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load_documents(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].id.as_deref(), Some("1"));
        assert_eq!(docs[0].content, "nine to five");
        assert_eq!(docs[1].id, None);
        assert_eq!(docs[1].content, "refunds");
        assert_eq!(docs[2].metadata.as_ref().unwrap()["lang"], "en");
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(load_documents("/definitely/not/here.json").is_err());
    }

    #[test]
    fn malformed_line_reports_location() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "{\"text\": \"ok\"}\nnot json\n").unwrap();
        let err = load_documents(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("bad.jsonl:2"));
    }
}
