//! Checks a decoded service payload against the expected shape before any
//! of it reaches the renderer.

use serde_json::{Map, Value};
use shared::domain::{
    Assessment, GeneratedRpm, Identification, LearnerProfile, LearningExperience,
    MaterialAnalysis, MeetingActivities, PromptProfile,
};
use tracing::warn;

use crate::error::MalformedResponse;

type Fields = Map<String, Value>;

/// Decodes the raw text returned by the service. Blank text is read as an
/// empty object, which then fails on the first required field.
pub fn decode_rpm(
    raw: &str,
    profile: PromptProfile,
    expected_meetings: usize,
) -> Result<GeneratedRpm, MalformedResponse> {
    let trimmed = raw.trim();
    let value = if trimmed.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(trimmed)
            .map_err(|e| MalformedResponse::new("$", format!("not valid JSON ({e})")))?
    };
    validate_rpm(&value, profile, expected_meetings)
}

pub fn validate_rpm(
    value: &Value,
    profile: PromptProfile,
    expected_meetings: usize,
) -> Result<GeneratedRpm, MalformedResponse> {
    let root = as_object(value, "$")?;
    let identification = identification(child_object(root, "$", "identifikasi")?, profile)?;
    let experience = experience(
        child_object(root, "$", "pengalamanBelajar")?,
        expected_meetings,
    )?;

    let asesmen = child_object(root, "$", "asesmen")?;
    let path = "$.asesmen";
    let assessment = Assessment {
        diagnostic: text(asesmen, path, "awal")?,
        formative: text(asesmen, path, "proses")?,
        summative: text(asesmen, path, "akhir")?,
    };

    Ok(GeneratedRpm {
        identification,
        experience,
        assessment,
    })
}

fn identification(
    fields: &Fields,
    profile: PromptProfile,
) -> Result<Identification, MalformedResponse> {
    let path = "$.identifikasi";
    let learner = match (profile, fields.get("murid")) {
        (PromptProfile::Deep, _) | (PromptProfile::Standard, Some(Value::Object(_))) => {
            let murid = child_object(fields, path, "murid")?;
            let path = "$.identifikasi.murid";
            LearnerProfile::Detailed {
                general: text(murid, path, "profilUmum")?,
                readiness: text(murid, path, "kesiapanBelajar")?,
                interest: text(murid, path, "minat")?,
                learning_style: text(murid, path, "gayaBelajar")?,
            }
        }
        (PromptProfile::Standard, _) => LearnerProfile::Narrative {
            text: text(fields, path, "siswa")?,
        },
    };

    let material = match (profile, fields.get("materi")) {
        (PromptProfile::Standard, None) => None,
        _ => {
            let materi = child_object(fields, path, "materi")?;
            let path = "$.identifikasi.materi";
            Some(MaterialAnalysis {
                knowledge_type: text(materi, path, "jenisPengetahuan")?,
                relevance: text(materi, path, "relevansi")?,
                difficulty: text(materi, path, "tingkatKesulitan")?,
                value_integration: text(materi, path, "integrasiNilai")?,
            })
        }
    };

    let solo_objective = match (profile, fields.get("tujuanPembelajaranSolo")) {
        (PromptProfile::Standard, None) => None,
        _ => Some(text(fields, path, "tujuanPembelajaranSolo")?),
    };

    Ok(Identification {
        learner,
        material,
        cross_discipline: text(fields, path, "lintasDisiplin")?,
        partnership: text(fields, path, "kemitraan")?,
        environment: text(fields, path, "lingkungan")?,
        digital_tools: text(fields, path, "pemanfaatanDigital")?,
        topic: text(fields, path, "topik")?,
        solo_objective,
    })
}

fn experience(
    fields: &Fields,
    expected_meetings: usize,
) -> Result<LearningExperience, MalformedResponse> {
    let path = "$.pengalamanBelajar.pertemuan";
    let entries = match fields.get("pertemuan") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(MalformedResponse::new(path, "expected an array")),
        None => return Err(MalformedResponse::new(path, "missing")),
    };
    if entries.len() < expected_meetings {
        return Err(MalformedResponse::new(
            path,
            format!(
                "expected {expected_meetings} meetings, got {}",
                entries.len()
            ),
        ));
    }
    if entries.len() > expected_meetings {
        warn!(
            expected = expected_meetings,
            received = entries.len(),
            "dropping surplus meetings from generation response"
        );
    }

    let mut meetings = Vec::with_capacity(expected_meetings);
    for (i, entry) in entries.iter().take(expected_meetings).enumerate() {
        let entry_path = format!("{path}[{i}]");
        let meeting = as_object(entry, &entry_path)?;
        meetings.push(MeetingActivities {
            orientation: text(meeting, &entry_path, "memahami")?,
            core: text(meeting, &entry_path, "mengaplikasi")?,
            reflection: text(meeting, &entry_path, "refleksi")?,
        });
    }
    Ok(LearningExperience { meetings })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Fields, MalformedResponse> {
    value
        .as_object()
        .ok_or_else(|| MalformedResponse::new(path, "expected an object"))
}

fn child_object<'a>(
    fields: &'a Fields,
    path: &str,
    key: &str,
) -> Result<&'a Fields, MalformedResponse> {
    let child_path = format!("{path}.{key}");
    match fields.get(key) {
        Some(value) => as_object(value, &child_path),
        None => Err(MalformedResponse::new(child_path, "missing")),
    }
}

fn text(fields: &Fields, path: &str, key: &str) -> Result<String, MalformedResponse> {
    let child_path = || format!("{path}.{key}");
    match fields.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(MalformedResponse::new(child_path(), "empty")),
        Some(_) => Err(MalformedResponse::new(child_path(), "expected a string")),
        None => Err(MalformedResponse::new(child_path(), "missing")),
    }
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
