//! Widget Configuration
//!
//! Everything that used to differ between copy-pasted widget variants lives
//! here as data: endpoint, layout, languages, quick replies, UI copy and the
//! agent registry.

use crate::api::AgentDescriptor;
use crate::error::{Result, WidgetError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default backend address when the host does not supply one
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

// ===== LANGUAGE =====

/// Interface language of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    Kz,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::Kz => "kz",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Language::Ru),
            "kz" | "kk" => Ok(Language::Kz),
            other => Err(WidgetError::InvalidConfig(format!(
                "unsupported language: {}",
                other
            ))),
        }
    }
}

/// A piece of UI copy in every supported language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub ru: String,
    pub kz: String,
}

impl LocalizedText {
    pub fn new(ru: impl Into<String>, kz: impl Into<String>) -> Self {
        Self {
            ru: ru.into(),
            kz: kz.into(),
        }
    }

    /// Same text for both languages
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            ru: text.clone(),
            kz: text,
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Ru => &self.ru,
            Language::Kz => &self.kz,
        }
    }
}

// ===== UI STRINGS =====

/// Localized copy the controller renders on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiStrings {
    /// Transient placeholder while a reply is pending
    pub typing: LocalizedText,

    /// Reply body missing or unreadable
    pub fallback_reply: LocalizedText,

    /// Backend answered with a non-2xx status
    pub service_unavailable: LocalizedText,

    /// Request never reached the backend
    pub connection_error: LocalizedText,
}

impl Default for UiStrings {
    fn default() -> Self {
        Self {
            typing: LocalizedText::new("Бот печатает…", "Бот жазып жатыр…"),
            fallback_reply: LocalizedText::new(
                "Извините, произошла ошибка. Попробуйте позже.",
                "Кешіріңіз, қате орын алды. Кейінірек қайталап көріңіз.",
            ),
            service_unavailable: LocalizedText::new(
                "Сервис временно недоступен. Попробуйте позже.",
                "Қызмет уақытша қолжетімсіз. Кейінірек қайталап көріңіз.",
            ),
            connection_error: LocalizedText::new(
                "Извините, произошла ошибка соединения.",
                "Кешіріңіз, байланыс қатесі орын алды.",
            ),
        }
    }
}

// ===== AGENTS =====

/// A selectable conversational persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Registry key the user switches by
    pub id: String,

    /// Header label
    pub label: String,

    /// Greeting shown when the conversation starts
    pub welcome: LocalizedText,

    /// Backend `agent_type` this persona routes to; `id` is sent when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

impl Agent {
    pub fn new(id: impl Into<String>, label: impl Into<String>, welcome: LocalizedText) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            welcome,
            route: None,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Value sent as `agent_type` in chat requests
    pub fn backend_type(&self) -> &str {
        self.route.as_deref().unwrap_or(&self.id)
    }
}

/// Ordered, immutable set of agents the user can switch between
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// Build a registry from an `/api/agents` listing.
    ///
    /// The backend only describes its agents in one language, so the
    /// description becomes the welcome text for every language.
    pub fn from_descriptors(descriptors: &[AgentDescriptor]) -> Self {
        let agents = descriptors
            .iter()
            .filter(|d| !d.agent_type.trim().is_empty())
            .map(|d| {
                Agent::new(
                    d.agent_type.clone(),
                    d.name.clone(),
                    LocalizedText::uniform(d.description.clone()),
                )
            })
            .collect();
        Self { agents }
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn first(&self) -> Option<&Agent> {
        self.agents.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new(vec![
            Agent::new(
                "qabyldau",
                "QabyldauBot",
                LocalizedText::new(
                    "Здравствуйте! Я QabyldauBot — помогу с вопросами поступления.",
                    "Сәлеметсіз бе! Мен QabyldauBot — түсу мәселелері бойынша көмектесемін.",
                ),
            )
            .with_route("admission"),
            Agent::new(
                "consultant",
                "Виртуальный консультант",
                LocalizedText::new(
                    "Привет! Я виртуальный консультант для студентов. Задайте вопрос по учебе или жизни в университете.",
                    "Сәлем! Мен студенттерге арналған виртуалды кеңесшімін. Оқу немесе университеттегі өмір туралы сұрақ қойыңыз.",
                ),
            )
            .with_route("academic"),
            Agent::new(
                "navigator",
                "Студенческий навигатор",
                LocalizedText::new(
                    "Я — студенческий навигатор. Помогу с навигацией по университету и цифровым сервисам.",
                    "Мен — студенттік навигатормын. Университет пен цифрлық қызметтер бойынша бағыт беремін.",
                ),
            )
            .with_route("general"),
            Agent::new(
                "green",
                "GreenNavigator",
                LocalizedText::new(
                    "Добро пожаловать! GreenNavigator поможет выпускникам с поиском работы и карьерой.",
                    "Қош келдіңіз! GreenNavigator түлектерге жұмыс іздеу мен мансап бойынша көмектеседі.",
                ),
            )
            .with_route("general"),
            Agent::new(
                "dorm",
                "Агент по общежитию",
                LocalizedText::new(
                    "Здравствуйте! Я — агент по вопросам общежития. Помогу с любыми бытовыми вопросами.",
                    "Сәлеметсіз бе! Мен жатақхана мәселелері бойынша агентпін. Кез келген тұрмыстық сұрақ бойынша көмектесемін.",
                ),
            )
            .with_route("student_life"),
        ])
    }
}

// ===== LAYOUT =====

/// Screen corner the widget is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

// ===== WIDGET CONFIG =====

/// Complete widget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Base URL the `/api/chat` and `/api/agents` paths are joined onto
    pub api_base_url: String,

    pub title: String,
    pub position: Position,
    pub theme: Theme,

    /// Language selected when the widget is created
    pub language: Language,

    /// Whether the panel starts expanded
    pub start_open: bool,

    /// Agent selected when the widget is created
    pub default_agent: String,

    pub quick_replies: Vec<String>,
    pub strings: UiStrings,
    pub agents: AgentRegistry,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            title: "BolashakBot - Помощник студента".to_string(),
            position: Position::default(),
            theme: Theme::default(),
            language: Language::default(),
            start_open: false,
            default_agent: "qabyldau".to_string(),
            quick_replies: vec![
                "Как поступить?".to_string(),
                "Стоимость обучения".to_string(),
                "Документы для поступления".to_string(),
                "Специальности".to_string(),
                "Контакты".to_string(),
                "Сроки подачи документов".to_string(),
            ],
            strings: UiStrings::default(),
            agents: AgentRegistry::default(),
        }
    }
}

impl WidgetConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WidgetConfig =
            toml::from_str(content).map_err(|e| WidgetError::ConfigLoad(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WidgetError::ConfigLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded widget config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_agents(mut self, agents: AgentRegistry) -> Self {
        if !agents.contains(&self.default_agent) {
            if let Some(first) = agents.first() {
                self.default_agent = first.id.clone();
            }
        }
        self.agents = agents;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(WidgetError::InvalidConfig(
                "agent registry is empty".to_string(),
            ));
        }
        if !self.agents.contains(&self.default_agent) {
            return Err(WidgetError::InvalidConfig(format!(
                "default agent '{}' is not in the registry",
                self.default_agent
            )));
        }
        reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            WidgetError::InvalidConfig(format!("bad api_base_url '{}': {}", self.api_base_url, e))
        })?;
        Ok(())
    }

    pub fn chat_url(&self) -> String {
        join_endpoint(&self.api_base_url, "api/chat")
    }

    pub fn agents_url(&self) -> String {
        join_endpoint(&self.api_base_url, "api/agents")
    }

    pub fn health_url(&self) -> String {
        join_endpoint(&self.api_base_url, "api/health")
    }
}

fn join_endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}
