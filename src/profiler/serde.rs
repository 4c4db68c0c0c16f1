use std::sync::Arc;

use indexmap::IndexMap;
use serde::{ser::SerializeStruct, Deserialize, Serialize};

use crate::error::ConfigError;
use crate::profiler::profile::Profile;
use crate::profiler::schema::PatternSchema;
use crate::profiler::score::ScoreEngine;
use crate::profiler::ProfileAnalyzer;

/// ProfileAnalyzerのデシリアライズ用のデータ構造
/// スキーマ参照を含まないため、そのままシリアライズ可能です。
/// `into_analyzer`メソッドで`Arc<PatternSchema>`を渡して
/// `ProfileAnalyzer`に変換できます。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerData {
    /// Version the stored profiles were scored under.
    pub schema_version: Box<str>,
    /// Registered profiles, insertion order preserved.
    pub profiles: IndexMap<Box<str>, Profile>,
}

impl AnalyzerData {
    /// `AnalyzerData`から`ProfileAnalyzer`に変換します。
    /// スキーマのバージョンが一致しない場合はエラーになります。
    /// (ゼロ埋めで黙って比較し続けるのはベクトル化側だけの方針)
    pub fn into_analyzer<E>(self, schema_ref: Arc<PatternSchema>) -> Result<ProfileAnalyzer<E>, ConfigError>
    where
        E: ScoreEngine,
    {
        if self.schema_version.as_ref() != schema_ref.version() {
            return Err(ConfigError::SchemaVersionMismatch {
                expected: schema_ref.version().into(),
                found: self.schema_version,
            });
        }
        let mut analyzer = ProfileAnalyzer::new(schema_ref);
        for (_, profile) in self.profiles {
            analyzer.insert(profile);
        }
        Ok(analyzer)
    }

    /// Compact CBOR encoding of the snapshot.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    /// Decode a snapshot from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}

impl<E> From<&ProfileAnalyzer<E>> for AnalyzerData
where
    E: ScoreEngine,
{
    fn from(analyzer: &ProfileAnalyzer<E>) -> Self {
        Self {
            schema_version: analyzer.schema().version().into(),
            profiles: analyzer.iter().map(|(k, p)| (Box::<str>::from(k), p.clone())).collect(),
        }
    }
}

impl<E> ProfileAnalyzer<E>
where
    E: ScoreEngine,
{
    /// Detach a serializable snapshot (schema reference excluded).
    pub fn to_data(&self) -> AnalyzerData {
        AnalyzerData::from(self)
    }
}

impl<E> Serialize for ProfileAnalyzer<E>
where
    E: ScoreEngine,
{
    /// ProfileAnalyzerをシリアライズします
    /// スキーマ参照は除外されます。デシリアライズには`AnalyzerData`を
    /// 使用してください。
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProfileAnalyzer", 2)?;
        state.serialize_field("schema_version", self.schema().version())?;
        state.serialize_field("profiles", &self.iter().collect::<IndexMap<&str, &Profile>>())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::schema::SCHEMA_VERSION_V2;

    fn analyzer_with_docs() -> ProfileAnalyzer {
        let mut analyzer = ProfileAnalyzer::new(Arc::new(PatternSchema::builtin_v2()));
        analyzer.insert(analyzer.analyze("z-doc", "Por tanto, el principio rige."));
        analyzer.insert(analyzer.analyze("a-doc", "Probablemente el relato narra."));
        analyzer
    }

    #[test]
    fn snapshot_roundtrips_through_cbor_preserving_order() {
        let analyzer = analyzer_with_docs();
        let bytes = analyzer.to_data().to_cbor().unwrap();
        let data = AnalyzerData::from_cbor(&bytes).unwrap();

        assert_eq!(&*data.schema_version, SCHEMA_VERSION_V2);
        let keys: Vec<&str> = data.profiles.keys().map(|k| k.as_ref()).collect();
        assert_eq!(keys, vec!["z-doc", "a-doc"]);

        let restored: ProfileAnalyzer = data
            .into_analyzer(Arc::new(PatternSchema::builtin_v2()))
            .unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get("z-doc"), analyzer.get("z-doc"));
    }

    #[test]
    fn schema_version_mismatch_is_refused_on_reattach() {
        let analyzer = analyzer_with_docs();
        let mut data = analyzer.to_data();
        data.schema_version = "v1".into();

        let err = data
            .into_analyzer::<crate::profiler::score::DefaultScoreEngine>(Arc::new(PatternSchema::builtin_v2()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaVersionMismatch { .. }));
    }

    #[test]
    fn analyzer_serializes_to_the_same_json_shape_as_its_data() {
        let analyzer = analyzer_with_docs();
        let direct = serde_json::to_value(&analyzer).unwrap();
        let via_data = serde_json::to_value(analyzer.to_data()).unwrap();
        assert_eq!(direct, via_data);
    }
}
