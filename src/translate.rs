//! Korean query expansion for semantic search.
//!
//! The restaurant corpus is embedded from English text, so a Korean query
//! lands in the wrong part of the vector space. Instead of full machine
//! translation we scan an ordered table of (pattern, keywords) rules and
//! append the English keywords of every matching rule to the original query.
//! The original text is always kept as a prefix so exact Korean matches are
//! never lost.
//!
//! A model-backed translator can be plugged in through the [`Translate`]
//! trait. When it is absent or fails, normalization silently falls back to
//! the pattern table.

use once_cell::sync::Lazy;
use regex::Regex;

/// One expansion rule: a disjunction of Korean terms and the English
/// keywords contributed when any of them occurs in the query.
struct ExpansionRule {
    pattern: Regex,
    keywords: &'static str,
}

fn rule(pattern: &str, keywords: &'static str) -> ExpansionRule {
    ExpansionRule {
        pattern: Regex::new(pattern).expect("invalid expansion pattern"),
        keywords,
    }
}

/// Ordered rule table, built once at first use.
static EXPANSION_RULES: Lazy<Vec<ExpansionRule>> = Lazy::new(|| {
    vec![
        // cuisines
        rule(
            "중국|중식|짜장|짬뽕|탕수육|마파두부|궁보|딤섬|중식집|중국집|중국관",
            "chinese food restaurant",
        ),
        rule(
            "일본|일식|스시|사시미|라멘|우동|소바|돈까스|규동|사케|일식집|일본집",
            "japanese sushi ramen restaurant",
        ),
        rule(
            "이탈리아|양식|파스타|피자|리조또|스파게티|이탈리아식|양식집",
            "italian pasta pizza restaurant",
        ),
        rule("태국|태식|팟타이|똠양꿍|그린커리|팬센|태국식", "thai food restaurant"),
        rule("인도|인도식|커리|난|탄두리|바스마티", "indian curry restaurant"),
        rule("베트남|월남|쌀국수|분짜|반미", "vietnamese pho restaurant"),
        rule("멕시코|멕시칸|타코|부리또|케사디야|나초", "mexican taco burrito restaurant"),
        rule("한국|한식|김치|불고기|갈비|비빔밥|냉면|삼겹살|한식집", "korean bbq restaurant"),
        rule("프랑스|프렌치|에스카르고|크로아상", "french restaurant"),
        rule("스페인|스패니시|파에야|타파스", "spanish restaurant"),
        // dishes
        rule("피자|피자집", "pizza restaurant"),
        rule("햄버거|버거|버거집", "burger hamburger restaurant"),
        rule("치킨|닭|프라이드|치킨집", "chicken fried restaurant"),
        rule("스테이크|소고기|스테이크하우스", "steak beef steakhouse"),
        rule("바베큐|바비큐|BBQ|구이", "barbecue bbq grilled restaurant"),
        rule("해산물|생선|새우|랍스터|조개|회|횟집", "seafood fish restaurant"),
        rule("샐러드|야채|채식", "salad vegetarian restaurant"),
        // venue types
        rule("카페|커피|에스프레소|라떼|아메리카노|커피숍", "cafe coffee shop"),
        rule("술집|바|맥주|와인|칵테일|호프|주점", "bar pub beer wine cocktail"),
        rule("패스트푸드|패패|패스트", "fast food restaurant"),
        rule("뷔페|부페|올유캔잇", "buffet all you can eat restaurant"),
        // meal times
        rule("아침|모닝|브런치", "breakfast brunch morning restaurant"),
        rule("점심|런치", "lunch restaurant"),
        rule("저녁|디너|만찬", "dinner evening restaurant"),
        rule("야식|새벽|밤", "late night restaurant"),
        // intent
        rule("추천해|추천해줘|알려줘|찾아줘|검색해|추천받고싶어", "recommend find search"),
        rule("맛있는|맛좋은|맛집", "delicious tasty good popular restaurant"),
        rule("좋은|괜찮은", "good restaurant"),
        rule("최고|베스트", "best excellent restaurant"),
        rule("먹고싶어|먹을|드시고", "eat food restaurant"),
        rule("가고싶어|가서|갈만한", "go visit restaurant"),
        // mood and amenities
        rule("가족|아이|어린이|키즈", "family kids children friendly restaurant"),
        rule("데이트|로맨틱|커플", "romantic date couple restaurant"),
        rule("조용|정적|차분", "quiet peaceful restaurant"),
        rule("분위기|무드|감성", "atmosphere ambiance mood restaurant"),
        rule("저렴|싸|가성비|가격", "cheap affordable budget restaurant"),
        rule("고급|비싼|프리미엄|럭셔리", "expensive premium upscale fine dining restaurant"),
    ]
});

/// Check whether the text contains any Hangul syllable (가-힣).
pub fn contains_korean(text: &str) -> bool {
    text.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c))
}

/// Optional heavier translation capability (e.g. a local seq2seq model).
///
/// Normalization never depends on this succeeding: a failing translator is
/// logged and the pattern table takes over.
pub trait Translate: Send + Sync {
    fn translate(&self, text: &str) -> anyhow::Result<String>;
}

/// Rewrites user queries into English-biased search strings.
///
/// Stateless apart from an optional translator handle, so it is safe to
/// share across concurrent searches.
#[derive(Default)]
pub struct QueryNormalizer {
    translator: Option<Box<dyn Translate>>,
}

impl QueryNormalizer {
    pub fn new() -> Self {
        Self { translator: None }
    }

    pub fn with_translator(translator: Box<dyn Translate>) -> Self {
        Self {
            translator: Some(translator),
        }
    }

    /// Expand a query for embedding.
    ///
    /// Non-Korean input is returned unchanged. Korean input gets English
    /// keywords appended; the original query is always preserved as a
    /// prefix.
    pub fn normalize(&self, query: &str) -> String {
        if !contains_korean(query) {
            return query.to_string();
        }

        if let Some(translator) = &self.translator {
            match translator.translate(query) {
                Ok(translated) if !translated.trim().is_empty() => {
                    log::info!("query translated: {:?} -> {:?}", query, translated.trim());
                    return format!("{} {}", query, translated.trim());
                }
                Ok(_) => {}
                Err(err) => {
                    log::warn!("translator failed, using pattern expansion: {err}");
                }
            }
        }

        expand_with_patterns(query)
    }
}

/// Append the keywords of every matching rule to the query.
///
/// Keywords are deduplicated in first-appearance order so the output is
/// deterministic.
fn expand_with_patterns(query: &str) -> String {
    let mut keywords: Vec<&str> = Vec::new();
    for rule in EXPANSION_RULES.iter() {
        if rule.pattern.is_match(query) {
            for word in rule.keywords.split_whitespace() {
                if !keywords.contains(&word) {
                    keywords.push(word);
                }
            }
        }
    }

    if keywords.is_empty() {
        return query.to_string();
    }

    let expanded = format!("{} {}", query, keywords.join(" "));
    log::info!("query expansion: {:?} -> {:?}", query, expanded);
    expanded
}
