use serde::Serialize;
use serde_json::{json, Map, Value};
use shared::domain::PromptProfile;

/// Structural description of the expected response, in the generation
/// service's schema dialect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaDescriptor(Value);

impl SchemaDescriptor {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn object(fields: &[&str]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|name| (name.to_string(), string()))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": fields,
    })
}

fn with_property(mut object: Value, name: &str, schema: Value) -> Value {
    if let Some(properties) = object["properties"].as_object_mut() {
        properties.insert(name.to_string(), schema);
    }
    if let Some(required) = object["required"].as_array_mut() {
        required.push(Value::String(name.to_string()));
    }
    object
}

pub fn output_schema(profile: PromptProfile) -> SchemaDescriptor {
    let common = ["lintasDisiplin", "kemitraan", "lingkungan", "pemanfaatanDigital", "topik"];
    let identification = match profile {
        PromptProfile::Standard => {
            let mut fields = vec!["siswa"];
            fields.extend(common);
            object(&fields)
        }
        PromptProfile::Deep => {
            let mut fields = common.to_vec();
            fields.push("tujuanPembelajaranSolo");
            let identification = with_property(
                object(&fields),
                "murid",
                object(&["profilUmum", "kesiapanBelajar", "minat", "gayaBelajar"]),
            );
            with_property(
                identification,
                "materi",
                object(&[
                    "jenisPengetahuan",
                    "relevansi",
                    "tingkatKesulitan",
                    "integrasiNilai",
                ]),
            )
        }
    };

    let experience = json!({
        "type": "OBJECT",
        "properties": {
            "pertemuan": {
                "type": "ARRAY",
                "items": object(&["memahami", "mengaplikasi", "refleksi"]),
            }
        },
        "required": ["pertemuan"],
    });

    SchemaDescriptor(json!({
        "type": "OBJECT",
        "properties": {
            "identifikasi": identification,
            "pengalamanBelajar": experience,
            "asesmen": object(&["awal", "proses", "akhir"]),
        },
        "required": ["identifikasi", "pengalamanBelajar", "asesmen"],
    }))
}
