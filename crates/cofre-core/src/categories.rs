//! Category keyword table
//!
//! An ordered list of `(kind, category, keywords)` rows. Rows are grouped by
//! kind bucket and buckets are scanned in priority order:
//! income, savings, fixed expense, variable expense. Within a bucket the
//! first row with a matching keyword wins, so income and savings signals
//! dominate when a message also mentions an expense keyword. Keywords match
//! whole words only.

use std::sync::OnceLock;

use serde::Serialize;

use crate::models::TransactionKind;

/// Category used when no keyword matches
pub const DEFAULT_CATEGORY: &str = "Miscellaneous";

/// Confidence reported when no keyword matches
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

/// One row of the category table
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRule {
    pub kind: TransactionKind,
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

/// Result of matching a message against the table
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatch {
    pub kind: TransactionKind,
    pub category: String,
    pub confidence: f64,
    /// Keyword that produced the match. `None` for the default.
    pub keyword: Option<&'static str>,
}

/// Bucket scan order
const BUCKET_ORDER: [TransactionKind; 4] = [
    TransactionKind::Income,
    TransactionKind::Savings,
    TransactionKind::FixedExpense,
    TransactionKind::VariableExpense,
];

const BUILTIN_RULES: &[CategoryRule] = &[
    // Income
    CategoryRule {
        kind: TransactionKind::Income,
        category: "Salary",
        keywords: &["salário", "salario", "contracheque"],
    },
    CategoryRule {
        kind: TransactionKind::Income,
        category: "Freelance",
        keywords: &["freela", "freelance", "projeto"],
    },
    CategoryRule {
        kind: TransactionKind::Income,
        category: "Investment Income",
        keywords: &["dividendos", "renda", "investimento", "juros"],
    },
    CategoryRule {
        kind: TransactionKind::Income,
        category: "Other Income",
        keywords: &[
            "recebi",
            "recebimento",
            "extra",
            "bônus",
            "bonus",
            "presente",
            "doação",
        ],
    },
    // Savings
    CategoryRule {
        kind: TransactionKind::Savings,
        category: "Investments",
        keywords: &["investi", "apliquei", "comprei ações", "tesouro", "cdb", "fii"],
    },
    CategoryRule {
        kind: TransactionKind::Savings,
        category: "Savings",
        keywords: &["poupança", "poupanca", "guardei", "reserva", "emergência"],
    },
    CategoryRule {
        kind: TransactionKind::Savings,
        category: "Funds",
        keywords: &["fundo", "fundo de investimento", "etf"],
    },
    CategoryRule {
        kind: TransactionKind::Savings,
        category: "Pension",
        keywords: &["previdência", "privada", "aposentadoria"],
    },
    // Fixed expenses
    CategoryRule {
        kind: TransactionKind::FixedExpense,
        category: "Housing",
        keywords: &[
            "aluguel",
            "luz",
            "água",
            "condomínio",
            "internet",
            "telefone",
            "gás",
        ],
    },
    CategoryRule {
        kind: TransactionKind::FixedExpense,
        category: "Transport",
        keywords: &[
            "ônibus",
            "metro",
            "uber",
            "taxi",
            "combustível",
            "estacionamento",
        ],
    },
    CategoryRule {
        kind: TransactionKind::FixedExpense,
        category: "Health",
        keywords: &[
            "plano de saúde",
            "médico",
            "dentista",
            "farmácia",
            "remédio",
            "academia",
        ],
    },
    CategoryRule {
        kind: TransactionKind::FixedExpense,
        category: "Education",
        keywords: &["faculdade", "curso", "livro", "material"],
    },
    CategoryRule {
        kind: TransactionKind::FixedExpense,
        category: "Insurance",
        keywords: &["seguro", "previdência"],
    },
    CategoryRule {
        kind: TransactionKind::FixedExpense,
        category: "Debt",
        keywords: &["financiamento", "empréstimo", "parcela"],
    },
    // Variable expenses
    CategoryRule {
        kind: TransactionKind::VariableExpense,
        category: "Food",
        keywords: &[
            "almoço",
            "janta",
            "lanche",
            "mercado",
            "supermercado",
            "restaurante",
            "ifood",
        ],
    },
    CategoryRule {
        kind: TransactionKind::VariableExpense,
        category: "Leisure",
        keywords: &["cinema", "netflix", "spotify", "shopping", "bar", "viagem"],
    },
    CategoryRule {
        kind: TransactionKind::VariableExpense,
        category: "Clothing",
        keywords: &["roupa", "sapato", "camisa", "calça"],
    },
    CategoryRule {
        kind: TransactionKind::VariableExpense,
        category: DEFAULT_CATEGORY,
        keywords: &["presente", "doação", "reparo", "manutenção"],
    },
];

/// Immutable category table
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

impl CategoryTable {
    /// Shared built-in table, built once
    pub fn builtin() -> &'static CategoryTable {
        static TABLE: OnceLock<CategoryTable> = OnceLock::new();
        TABLE.get_or_init(|| CategoryTable::from_rules(BUILTIN_RULES.to_vec()))
    }

    /// Build a table from custom rows. Rows are reordered into bucket priority,
    /// keeping their relative order within a bucket.
    pub fn from_rules(mut rules: Vec<CategoryRule>) -> Self {
        rules.sort_by_key(|r| bucket_rank(r.kind));
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Confidence assigned to a keyword match of the given kind
    pub fn confidence_for(kind: TransactionKind) -> f64 {
        match kind {
            TransactionKind::Income | TransactionKind::Savings => 0.9,
            TransactionKind::FixedExpense => 0.8,
            TransactionKind::VariableExpense => 0.7,
        }
    }

    /// Match a message against the table. Always returns a category:
    /// unmatched messages fall back to a variable expense in
    /// [`DEFAULT_CATEGORY`].
    pub fn match_message(&self, message: &str) -> CategoryMatch {
        let text = message.to_lowercase();

        for rule in &self.rules {
            if let Some(keyword) = rule
                .keywords
                .iter()
                .copied()
                .find(|k| contains_word(&text, k))
            {
                return CategoryMatch {
                    kind: rule.kind,
                    category: rule.category.to_string(),
                    confidence: Self::confidence_for(rule.kind),
                    keyword: Some(keyword),
                };
            }
        }

        CategoryMatch {
            kind: TransactionKind::VariableExpense,
            category: DEFAULT_CATEGORY.to_string(),
            confidence: DEFAULT_CONFIDENCE,
            keyword: None,
        }
    }

    /// Distinct category names for a kind, in table order
    pub fn categories_for(&self, kind: TransactionKind) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for rule in self.rules.iter().filter(|r| r.kind == kind) {
            if !names.contains(&rule.category) {
                names.push(rule.category);
            }
        }
        if kind == TransactionKind::VariableExpense && !names.contains(&DEFAULT_CATEGORY) {
            names.push(DEFAULT_CATEGORY);
        }
        names
    }

    pub fn is_known(&self, kind: TransactionKind, category: &str) -> bool {
        self.categories_for(kind)
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Canonical spelling of a known category
    pub fn canonical(&self, kind: TransactionKind, category: &str) -> Option<&'static str> {
        self.categories_for(kind)
            .into_iter()
            .find(|c| c.eq_ignore_ascii_case(category.trim()))
    }

    /// One line per kind listing its categories, used in oracle prompts
    pub fn catalogue(&self) -> String {
        BUCKET_ORDER
            .iter()
            .map(|kind| format!("- {}: {}", kind.as_str(), self.categories_for(*kind).join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `keyword` occurs in `text` with no letter or digit on either side
fn contains_word(text: &str, keyword: &str) -> bool {
    text.match_indices(keyword).any(|(start, matched)| {
        let end = start + matched.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn bucket_rank(kind: TransactionKind) -> usize {
    BUCKET_ORDER
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(BUCKET_ORDER.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_beats_fixed_expense() {
        let m = CategoryTable::builtin().match_message("recebi aluguel 100");
        assert_eq!(m.kind, TransactionKind::Income);
        assert_eq!(m.confidence, 0.9);
    }

    #[test]
    fn test_savings_beats_fixed_insurance() {
        // "previdência" is listed under both savings and insurance
        let m = CategoryTable::builtin().match_message("previdência 300");
        assert_eq!(m.kind, TransactionKind::Savings);
        assert_eq!(m.category, "Pension");
    }

    #[test]
    fn test_fixed_expense_confidence() {
        let m = CategoryTable::builtin().match_message("Aluguel 1500");
        assert_eq!(m.kind, TransactionKind::FixedExpense);
        assert_eq!(m.category, "Housing");
        assert_eq!(m.confidence, 0.8);
    }

    #[test]
    fn test_variable_expense_match() {
        let m = CategoryTable::builtin().match_message("almoço no centro");
        assert_eq!(m.kind, TransactionKind::VariableExpense);
        assert_eq!(m.category, "Food");
        assert_eq!(m.confidence, 0.7);
        assert_eq!(m.keyword, Some("almoço"));
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let table = CategoryTable::builtin();

        // "bar" inside "barato", "extra" inside "extrato"
        let m = table.match_message("tênis barato 120");
        assert_eq!(m.category, DEFAULT_CATEGORY);
        let m = table.match_message("tarifa do extrato 12");
        assert_eq!(m.kind, TransactionKind::VariableExpense);
        assert_ne!(m.category, "Other Income");

        // "etf" inside "netflix"
        let m = table.match_message("netflix 39,90");
        assert_eq!(m.kind, TransactionKind::VariableExpense);
        assert_eq!(m.category, "Leisure");

        let m = table.match_message("cerveja no bar, 45");
        assert_eq!(m.category, "Leisure");
        assert_eq!(m.keyword, Some("bar"));
    }

    #[test]
    fn test_default_category() {
        let m = CategoryTable::builtin().match_message("coisa aleatória");
        assert_eq!(m.kind, TransactionKind::VariableExpense);
        assert_eq!(m.category, DEFAULT_CATEGORY);
        assert_eq!(m.confidence, DEFAULT_CONFIDENCE);
        assert!(m.keyword.is_none());
    }

    #[test]
    fn test_from_rules_reorders_buckets() {
        let table = CategoryTable::from_rules(vec![
            CategoryRule {
                kind: TransactionKind::VariableExpense,
                category: "Pets",
                keywords: &["ração"],
            },
            CategoryRule {
                kind: TransactionKind::Income,
                category: "Sales",
                keywords: &["vendi"],
            },
        ]);
        assert_eq!(table.rules()[0].kind, TransactionKind::Income);
        let m = table.match_message("vendi ração 40");
        assert_eq!(m.category, "Sales");
    }

    #[test]
    fn test_catalogue_lists_every_kind() {
        let catalogue = CategoryTable::builtin().catalogue();
        assert_eq!(catalogue.lines().count(), 4);
        assert!(catalogue.contains("fixed_expense: Housing, Transport"));
        assert!(catalogue.contains("Miscellaneous"));
    }

    #[test]
    fn test_canonical_is_case_insensitive() {
        let table = CategoryTable::builtin();
        assert_eq!(
            table.canonical(TransactionKind::VariableExpense, "leisure"),
            Some("Leisure")
        );
        assert_eq!(table.canonical(TransactionKind::Income, "Leisure"), None);
    }
}
