//! Gemini API連携（生成クライアント）
//!
//! 3つのリモート操作を提供する:
//! - produce_style_guide: テーマ → スタイルガイド本文
//! - produce_image: フルプロンプト → 画像（Data URL）
//! - produce_edited_image: 既存画像 + 編集指示 → 画像（Data URL）
//!
//! 画像ハンドルは "data:image/png;base64,..." 形式のData URL文字列。

use crate::config::Config;
use crate::error::{ChessSetError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 生成クライアントの契約
///
/// オーケストレータはこのトレイト越しにのみリモート呼び出しを行う
/// （テストではモック実装を差し込む）。
#[async_trait]
pub trait GenerationClient {
    async fn produce_style_guide(&self, theme: &str) -> Result<String>;
    async fn produce_image(&self, prompt: &str) -> Result<String>;
    async fn produce_edited_image(&self, source_image: &str, instruction: &str)
        -> Result<String>;
}

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "responseModalities", skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "inlineData", default)]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Deserialize)]
struct ResponseInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Data URLからBase64データ部分を抽出
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    if !data_url.starts_with("data:") {
        return None;
    }
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出（抽出失敗時は"image/png"）
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("image/png")
}

/// Gemini REST APIクライアント
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ChessSetError::Config(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    /// Gemini API呼び出し（共通処理）
    async fn call(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse> {
        let url = format!("{}/{}:generateContent?key={}", GEMINI_API_BASE, model, self.api_key);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ChessSetError::ApiCall(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChessSetError::ApiCall(format!("status {}: {}", status, body)));
        }

        response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ChessSetError::ApiCall(format!("invalid response: {}", e)))
    }

    /// レスポンスから最初のテキストパートを取り出す
    fn first_text(response: GeminiResponse) -> Result<String> {
        response
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ChessSetError::EmptyResult)
    }

    /// レスポンスから最初の画像パートを取り出してData URL化
    fn first_image(response: GeminiResponse) -> Result<String> {
        response
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.inline_data)
            .map(|d| format!("data:{};base64,{}", d.mime_type, d.data))
            .ok_or(ChessSetError::EmptyResult)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn produce_style_guide(&self, theme: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: crate::prompts::build_style_guide_prompt(theme),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.8),
                response_modalities: None,
            }),
        };

        let response = self.call(&self.text_model, &request).await?;
        Self::first_text(response)
    }

    async fn produce_image(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: prompt.to_string() }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_modalities: Some(vec!["IMAGE".into(), "TEXT".into()]),
            }),
        };

        let response = self.call(&self.image_model, &request).await?;
        Self::first_image(response)
    }

    async fn produce_edited_image(
        &self,
        source_image: &str,
        instruction: &str,
    ) -> Result<String> {
        // 編集元はData URL前提。崩れていたら呼び出し順序の契約違反
        let base64_data = extract_base64_from_data_url(source_image)
            .ok_or_else(|| ChessSetError::MalformedImage("not a base64 data URL".into()))?;
        let mime_type = extract_mime_type_from_data_url(source_image);

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: instruction.to_string() },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: base64_data.to_string(),
                        },
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_modalities: Some(vec!["IMAGE".into(), "TEXT".into()]),
            }),
        };

        let response = self.call(&self.image_model, &request).await?;
        Self::first_image(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // Data URL抽出テスト
    // =============================================

    #[test]
    fn test_extract_base64_from_data_url_png() {
        let data_url = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(extract_base64_from_data_url(data_url), Some("iVBORw0KGgo="));
    }

    #[test]
    fn test_extract_base64_from_data_url_invalid() {
        assert_eq!(extract_base64_from_data_url("not a data url"), None);
        assert_eq!(extract_base64_from_data_url(""), None);
    }

    #[test]
    fn test_extract_mime_type_png() {
        let data_url = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(extract_mime_type_from_data_url(data_url), "image/png");
    }

    #[test]
    fn test_extract_mime_type_webp() {
        let data_url = "data:image/webp;base64,UklGR";
        assert_eq!(extract_mime_type_from_data_url(data_url), "image/webp");
    }

    #[test]
    fn test_extract_mime_type_default() {
        // 不正なフォーマットの場合はデフォルト値を返す
        assert_eq!(extract_mime_type_from_data_url("invalid"), "image/png");
    }

    // =============================================
    // リクエスト/レスポンス シリアライズテスト
    // =============================================

    #[test]
    fn test_request_serialize_with_modalities() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: "a rook".to_string() }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_modalities: Some(vec!["IMAGE".into(), "TEXT".into()]),
            }),
        };

        let json = serde_json::to_string(&request).expect("シリアライズ失敗");
        assert!(json.contains("\"contents\""));
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"responseModalities\":[\"IMAGE\",\"TEXT\"]"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_part_inline_data_serialize() {
        let part = Part::InlineData {
            inline_data: InlineData {
                mime_type: "image/png".to_string(),
                data: "base64data".to_string(),
            },
        };
        let json = serde_json::to_string(&part).expect("シリアライズ失敗");
        assert!(json.contains("\"inline_data\""));
        assert!(json.contains("\"mime_type\":\"image/png\""));
    }

    #[test]
    fn test_response_deserialize_image_part() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "here is your piece" },
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } }
                    ]
                }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        let image = GeminiClient::first_image(response).expect("画像パートなし");
        assert_eq!(image, "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_response_without_image_is_empty_result() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [ { "text": "policy refusal" } ] }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert!(matches!(
            GeminiClient::first_image(response),
            Err(ChessSetError::EmptyResult)
        ));
    }

    #[test]
    fn test_first_text_trims_and_rejects_empty() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [ { "text": "  a style guide  " } ] }
            }]
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(GeminiClient::first_text(response).unwrap(), "a style guide");

        let empty: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            GeminiClient::first_text(empty),
            Err(ChessSetError::EmptyResult)
        ));
    }
}
