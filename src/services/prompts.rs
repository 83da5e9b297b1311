//! 梗分析提示词
//!
//! 梗正文直接追加在模板末尾。

use crate::models::CsvSchema;

/// 系统指令
pub const SYSTEM_INSTRUCTION: &str = r#"# 시스템 지침
당신은 한국 인터넷 밈 전문 분석가입니다.
나무위키에서 추출한 밈 데이터를 정확하고 객관적으로 분석하여 구조화된 JSON으로 정리하세요.
주의사항:
1. 모든 필드를 빠짐없이 채워주세요
2. 유행 정도는 실제 영향력을 기준으로 객관적으로 평가하세요
3. 시기 정보는 가능한 구체적으로 작성하세요
4. 관련 키워드는 검색 최적화를 고려하여 포함하세요
5. 불확실한 정보는 추측하지 말고 "정보 없음"으로 표기하세요
6. 이미지 또는 영상으로 대표되는 밈인지 여부를 명확히 구분하고 표기하세요
"#;

const RICH_PROMPT: &str = r#"# Role
당신은 밈의 역사와 문화적 맥락을 깊이 이해하는 **'밈 문화 연구가'**입니다. 사용자가 밈의 배경과 재미를 충분히 이해할 수 있도록 풍부하고 상세한 설명을 담아 지정된 JSON 형식으로 데이터를 정리해야 합니다.

# Instruction
주어진 밈에 대해 분석하고, 반드시 아래에 정의된 JSON 구조와 예시를 참고하여 응답해야 합니다. 다른 설명 없이 JSON 데이터만 응답해주세요.

# JSON Structure
{
  "name": "밈의 공식 명칭 (String)",
  "meaning": "밈의 핵심 의미를 1~3 문장으로 설명하되, 어떤 감정이나 상황을 나타내는지 **뉘앙스를 포함하여 서술**해주세요. (String)",
  "usageExamples": [
    "단순한 문장 나열이 아닌, **어떤 상황에서 사용하면 재미있는지 맥락이 드러나는** 예시를 2~3개 작성해주세요. (String)",
    "예시 2",
    "예시 3"
  ],
  "origin": "최초 출처와 함께, **어떤 과정과 계기를 통해 유행하게 되었는지 간략한 스토리를 포함**하여 서술해주세요. (String)",
  "relatedMemes": [
    "관련/파생 밈 이름 (String)"
  ],
  "tags": [
    "밈의 특징과 카테고리를 잘 나타내는 키워드 5개 이상 (String)",
    "키워드2",
    "키워드3"
  ]
}

# Example (for '무야호' meme)
{
  "name": "무야호",
  "meaning": "단순한 기쁨을 넘어, 예상치 못한 행운이나 큰 성취감에 벅차올라 터져 나오는 순수한 환희를 표현합니다. 약간의 어설픔이 더해져 유머러스한 느낌을 줍니다.",
  "usageExamples": [
    "월급날 통장 보고 소리 질렀다... 이것이 바로 '무야호'의 심정.",
    "친구가 노래방에서 최고점 찍고 '무야호' 외치는데 너무 웃겼어.",
    "밤새 코딩한 거 에러 없이 돌아갈 때의 그 기분? 무야호 그 자체."
  ],
  "origin": "2010년 MBC <무한도전> '알래스카' 편에서 한 어르신이 '무한도전'을 '무야호'로 잘못 외친 장면에서 시작됐습니다. 이 순수한 외침이 10년이 지난 후 유튜브 알고리즘을 통해 재발견되어 폭발적으로 유행했습니다.",
  "relatedMemes": [
    "그만큼 신나시다는 거지"
  ],
  "tags": ["무한도전", "정형돈", "알래스카", "신남", "환호", "감탄사"]
}

분석할 내용:
"#;

const FLAT_PROMPT: &str = r##"# Role
당신은 밈의 역사와 문화적 맥락을 깊이 이해하는 **'밈 문화 연구가'**입니다. 사용자가 밈의 배경과 재미를 충분히 이해할 수 있도록 풍부하고 상세한 설명을 담아 지정된 JSON 형식으로 데이터를 정리해야 합니다.

# Instruction
주어진 밈에 대해 분석하고, 반드시 아래에 정의된 JSON 구조와 예시를 참고하여 응답해야 합니다. 다른 설명 없이 JSON 데이터만 응답해주세요.

# JSON Structure
{
  "title": "밈의 제목 (String)",
  "origin": "밈의 기원과 유래를 상세히 설명해주세요. (String) (최대 300자 이내)",
  "usageContext": "밈이 언제, 어떤 상황에서 사용되는지 맥락을 자세히 설명해주세요. (String) (최대 300자 이내)",
  "trendPeriod": "밈이 유행한 시기 (YYYY 형식, 가장 유행했던 연도 하나만 기재)",
  "imgUrl": "관련 이미지 URL이 있다면 포함, 없으면 null (String)",
  "hashtags": ["#해시태그1", "#해시태그2"]
}

# Example (for '무야호' meme)
{
  "title": "무야호",
  "origin": "2010년 MBC 무한도전 알래스카 편에서 한 어르신이 '무한도전'을 '무야호'로 잘못 외친 장면에서 시작됐습니다. 이 순수한 외침이 10년이 지난 후 유튜브 알고리즘을 통해 재발견되어 폭발적으로 유행했습니다.",
  "usageContext": "예상치 못한 행운이나 큰 성취감에 벅차올라 터져 나오는 순수한 환희를 표현할 때 사용합니다.",
  "trendPeriod": "2021",
  "imgUrl": null,
  "hashtags": ["#무한도전", "#무야호", "#알래스카", "#인터넷밈", "#유행어", "#환희"]
}

분석할 내용:
"##;

/// 对应导出结构的提示词模板
pub fn prompt_template(schema: CsvSchema) -> &'static str {
    match schema {
        CsvSchema::Rich => RICH_PROMPT,
        CsvSchema::Flat => FLAT_PROMPT,
    }
}

/// 模板 + 梗正文
pub fn build_prompt(schema: CsvSchema, meme_content: &str) -> String {
    let template = prompt_template(schema);
    let mut prompt = String::with_capacity(template.len() + meme_content.len());
    prompt.push_str(template);
    prompt.push_str(meme_content);
    prompt
}
