//! 公告（edital）分析接口的请求与响应
//!
//! 分析逻辑在外部服务中，这里只描述契约。所有字段都允许缺省，
//! 服务端省略某一段时按空处理。

use serde::{Deserialize, Serialize};

/// 公告正文最短长度（字符）
pub const MIN_CONTENT_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub conteudo: String,
    pub url_edital: Option<String>,
    pub banca: Option<String>,
}

impl AnalysisRequest {
    pub fn new(conteudo: impl Into<String>) -> Self {
        Self {
            conteudo: conteudo.into(),
            url_edital: None,
            banca: None,
        }
    }

    pub fn with_banca(mut self, banca: impl Into<String>) -> Self {
        self.banca = Some(banca.into()).filter(|b: &String| !b.trim().is_empty());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url_edital = Some(url.into()).filter(|u: &String| !u.trim().is_empty());
        self
    }

    /// 本地校验，避免把空内容发给服务
    pub fn validate(&self) -> Result<(), String> {
        let trimmed = self.conteudo.trim();
        if trimmed.is_empty() {
            return Err("公告内容不能为空".to_string());
        }
        let chars = trimmed.chars().count();
        if chars < MIN_CONTENT_CHARS {
            return Err(format!(
                "公告内容至少需要 {} 个字符，实际 {}",
                MIN_CONTENT_CHARS, chars
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditalAnalysis {
    pub status: String,
    #[serde(default)]
    pub resultado: AnalysisResult,
    #[serde(default)]
    pub tempo_processamento: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub analise_basica: Option<BasicAnalysis>,
    pub informacoes_extraidas: ExtractedInfo,
    pub resumo_executivo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BasicAnalysis {
    pub tipo_documento: Option<String>,
    pub banca_organizadora: Option<String>,
    pub orgao_responsavel: Option<String>,
    pub numero_secoes: u32,
    pub palavras_totais: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractedInfo {
    pub cargos: Vec<Cargo>,
    pub vagas: Vec<Vagas>,
    pub disciplinas: Vec<Disciplina>,
    pub datas: Vec<DataImportante>,
    pub valores: Vec<Valor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cargo {
    pub cargo: String,
    pub contexto: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Vagas {
    pub numero_vagas: u32,
    pub contexto: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Disciplina {
    pub disciplina: String,
    pub tipo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataImportante {
    pub data: String,
    pub tipo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Valor {
    pub valor: f64,
    pub valor_formatado: String,
    pub tipo: String,
}

impl ExtractedInfo {
    /// 总空缺数
    pub fn total_vagas(&self) -> u32 {
        self.vagas.iter().map(|v| v.numero_vagas).sum()
    }
}
