/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次模型调用的截止时间（秒），0 表示不限制
    pub llm_timeout_secs: u64,
    // --- 存储配置 ---
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// 历史记录默认条数
    pub history_limit: usize,
    // --- 请求配置 ---
    /// 是否要求请求携带学生ID
    pub require_student_id: bool,
    /// 错误响应中是否附带诊断详情
    pub debug_errors: bool,
    /// 同时处理的请求数量
    pub max_concurrent_requests: usize,
    /// 待批改作文（TOML）存放目录
    pub essay_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "http://localhost:8000/v1".to_string(),
            llm_model_name: "google/flan-t5-base".to_string(),
            llm_timeout_secs: 60,
            database_path: "essays.db".to_string(),
            history_limit: 10,
            require_student_id: true,
            debug_errors: true,
            max_concurrent_requests: 8,
            essay_folder: "essays".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_timeout_secs),
            database_path: std::env::var("DATABASE_PATH").unwrap_or(default.database_path),
            history_limit: std::env::var("HISTORY_LIMIT").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.history_limit),
            require_student_id: std::env::var("REQUIRE_STUDENT_ID").ok().and_then(|v| parse_flag(&v)).unwrap_or(default.require_student_id),
            debug_errors: std::env::var("DEBUG").ok().and_then(|v| parse_flag(&v)).unwrap_or(default.debug_errors),
            max_concurrent_requests: std::env::var("MAX_CONCURRENT_REQUESTS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_requests),
            essay_folder: std::env::var("ESSAY_FOLDER").unwrap_or(default.essay_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| parse_flag(&v)).unwrap_or(default.verbose_logging),
        }
    }

    /// 模型调用截止时间，`None` 表示不限制
    pub fn llm_timeout(&self) -> Option<std::time::Duration> {
        (self.llm_timeout_secs > 0).then(|| std::time::Duration::from_secs(self.llm_timeout_secs))
    }
}

/// 解析开关类环境变量（`1`/`0`、`true`/`false`）
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
