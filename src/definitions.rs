//! 跨模組共用的基本定義。

/// 目前接收鍵盤輸入的區域。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusArea {
    /// 左側的代理與對話清單。
    Sidebar,
    /// 下方的訊息輸入框。
    #[default]
    Composer,
}

impl FocusArea {
    pub fn toggle(self) -> Self {
        match self {
            FocusArea::Sidebar => FocusArea::Composer,
            FocusArea::Composer => FocusArea::Sidebar,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FocusArea::Sidebar => "SIDEBAR",
            FocusArea::Composer => "INPUT",
        }
    }
}

pub const BRAND_TITLE: &str = "Amy Agent";
pub const BRAND_SUBTITLE: &str = "ADK Console";

/// 每次 PageUp/PageDown 捲動的行數。
pub const TRANSCRIPT_PAGE: u16 = 5;
