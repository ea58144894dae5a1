//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Period;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(owner: i64, amount: Decimal, category: &str, on: NaiveDate) -> NewTransaction {
        NewTransaction::manual(
            owner,
            TransactionKind::VariableExpense,
            amount,
            category,
            category,
            on,
        )
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.recent_transactions(1, 10).unwrap().is_empty());
        assert!(!db.is_encrypted().unwrap());
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let columns: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name IN ('owner_id', 'kind', 'amount', 'category', 'occurred_on', 'detected_by', 'import_hash')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(columns, 7);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('budgets', 'goals')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn test_transaction_round_trip_keeps_exact_amount() {
        let db = Database::in_memory().unwrap();
        let mut tx = expense(1, dec!(45.50), "Food", date(2024, 3, 5));
        tx.detected_by = DetectedBy::Rule;
        tx.original_message = Some("gastei 45,50 no mercado".into());

        let id = db.create_transaction(&tx).unwrap();
        let stored = db.get_transaction(id).unwrap().unwrap();

        assert_eq!(stored.amount, dec!(45.50));
        assert_eq!(stored.kind, TransactionKind::VariableExpense);
        assert_eq!(stored.detected_by, DetectedBy::Rule);
        assert_eq!(stored.occurred_on, date(2024, 3, 5));
        assert_eq!(
            stored.original_message.as_deref(),
            Some("gastei 45,50 no mercado")
        );
    }

    #[test]
    fn test_create_rejects_non_positive_amount() {
        let db = Database::in_memory().unwrap();
        let err = db
            .create_transaction(&expense(1, dec!(0), "Food", date(2024, 3, 5)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
        assert!(db.recent_transactions(1, 10).unwrap().is_empty());
    }

    #[test]
    fn test_update_transaction_partial() {
        let db = Database::in_memory().unwrap();
        let id = db
            .create_transaction(&expense(1, dec!(20), "Food", date(2024, 3, 5)))
            .unwrap();

        let updated = db
            .update_transaction(
                id,
                &TransactionUpdate {
                    category: Some("Leisure".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.category, "Leisure");
        assert_eq!(updated.amount, dec!(20));

        let err = db
            .update_transaction(
                id,
                &TransactionUpdate {
                    amount: Some(dec!(-1)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
    }

    #[test]
    fn test_update_missing_transaction() {
        let db = Database::in_memory().unwrap();
        let err = db
            .update_transaction(
                999,
                &TransactionUpdate {
                    description: Some("x".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_delete_transaction() {
        let db = Database::in_memory().unwrap();
        let id = db
            .create_transaction(&expense(1, dec!(20), "Food", date(2024, 3, 5)))
            .unwrap();
        assert!(db.delete_transaction(id).unwrap());
        assert!(!db.delete_transaction(id).unwrap());
        assert!(db.get_transaction(id).unwrap().is_none());
    }

    #[test]
    fn test_range_is_inclusive_and_owner_scoped() {
        let db = Database::in_memory().unwrap();
        db.create_transaction(&expense(1, dec!(1), "Food", date(2024, 2, 29)))
            .unwrap();
        db.create_transaction(&expense(1, dec!(2), "Food", date(2024, 3, 1)))
            .unwrap();
        db.create_transaction(&expense(1, dec!(3), "Food", date(2024, 3, 31)))
            .unwrap();
        db.create_transaction(&expense(2, dec!(4), "Food", date(2024, 3, 15)))
            .unwrap();

        let period = Period::new(3, 2024).unwrap();
        let txs = db.list_transactions_for_period(1, &period).unwrap();
        let amounts: Vec<Decimal> = txs.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![dec!(2), dec!(3)]);
    }

    #[test]
    fn test_search_and_count() {
        let db = Database::in_memory().unwrap();
        db.create_transaction(&NewTransaction::manual(
            1,
            TransactionKind::VariableExpense,
            dec!(30),
            "Transport",
            "uber pro trabalho",
            date(2024, 3, 2),
        ))
        .unwrap();
        db.create_transaction(&expense(1, dec!(100), "Food", date(2024, 3, 3)))
            .unwrap();
        db.create_transaction(&expense(1, dec!(9.90), "Food", date(2024, 3, 4)))
            .unwrap();

        let found = db
            .search_transactions(1, TransactionFilter::new().search(Some("UBER")), 10, 0)
            .unwrap();
        assert_eq!(found.len(), 1);

        let food = TransactionFilter::new()
            .category(Some("food"))
            .sort_field(Some("amount"))
            .sort_order(Some("asc"));
        let sorted = db.search_transactions(1, food, 10, 0).unwrap();
        assert_eq!(sorted[0].amount, dec!(9.90));
        assert_eq!(sorted[1].amount, dec!(100));

        assert_eq!(db.count_transactions(1, TransactionFilter::new()).unwrap(), 3);
        assert_eq!(db.count_transactions(2, TransactionFilter::new()).unwrap(), 0);

        let page = db
            .search_transactions(1, TransactionFilter::new(), 2, 2)
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_imported_duplicates_are_detected() {
        let db = Database::in_memory().unwrap();
        let mut tx = expense(1, dec!(12), "Food", date(2024, 3, 5));
        tx.import_hash = Some("abc".into());

        let first = db.insert_imported_transaction(&tx).unwrap();
        let TransactionInsertResult::Inserted(id) = first else {
            panic!("expected insert, got {:?}", first);
        };
        assert_eq!(
            db.insert_imported_transaction(&tx).unwrap(),
            TransactionInsertResult::Duplicate(id)
        );
    }

    #[test]
    fn test_unhashed_row_with_same_content_is_duplicate() {
        let db = Database::in_memory().unwrap();
        let recorded = db
            .create_transaction(&expense(1, dec!(45.5), "Food", date(2024, 3, 5)))
            .unwrap();

        let mut imported = expense(1, dec!(45.50), "Food", date(2024, 3, 5));
        imported.category = "food".into();
        imported.import_hash = Some("from-file".into());
        assert_eq!(
            db.insert_imported_transaction(&imported).unwrap(),
            TransactionInsertResult::Duplicate(recorded)
        );

        // Any differing field makes a new row
        let other_day = expense(1, dec!(45.50), "Food", date(2024, 3, 6));
        assert!(matches!(
            db.insert_imported_transaction(&other_day).unwrap(),
            TransactionInsertResult::Inserted(_)
        ));
        let other_owner = expense(2, dec!(45.50), "Food", date(2024, 3, 5));
        assert!(matches!(
            db.insert_imported_transaction(&other_owner).unwrap(),
            TransactionInsertResult::Inserted(_)
        ));
    }

    #[test]
    fn test_budget_upsert_replaces_limit() {
        let db = Database::in_memory().unwrap();
        let period = Period::new(3, 2024).unwrap();

        let id = db.upsert_budget(1, "Leisure", dec!(300), &period).unwrap();
        let id2 = db.upsert_budget(1, "Leisure", dec!(350), &period).unwrap();
        assert_eq!(id, id2);

        let budgets = db.list_budgets(1, &period).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].monthly_limit, dec!(350));
        assert_eq!(budgets[0].period().unwrap(), period);

        // Other months and owners are separate
        let april = Period::new(4, 2024).unwrap();
        assert!(db.list_budgets(1, &april).unwrap().is_empty());
        assert!(db.list_budgets(2, &period).unwrap().is_empty());
    }

    #[test]
    fn test_budget_key_ignores_category_case() {
        let db = Database::in_memory().unwrap();
        let period = Period::new(3, 2024).unwrap();

        let id = db.upsert_budget(1, "leisure", dec!(300), &period).unwrap();
        assert_eq!(db.upsert_budget(1, "Leisure", dec!(300), &period).unwrap(), id);

        let saude = db.upsert_budget(1, "SAÚDE", dec!(200), &period).unwrap();
        assert_eq!(db.upsert_budget(1, "saúde", dec!(250), &period).unwrap(), saude);

        let budgets = db.list_budgets(1, &period).unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].category, "Leisure");
        assert_eq!(budgets[1].category, "saúde");
        assert_eq!(budgets[1].monthly_limit, dec!(250));
    }

    #[test]
    fn test_budget_rejects_non_positive_limit() {
        let db = Database::in_memory().unwrap();
        let period = Period::new(3, 2024).unwrap();
        assert!(matches!(
            db.upsert_budget(1, "Leisure", dec!(0), &period),
            Err(Error::InvalidAmount(_))
        ));
        assert!(db.upsert_budget(1, "  ", dec!(10), &period).is_err());
    }

    #[test]
    fn test_delete_budget() {
        let db = Database::in_memory().unwrap();
        let period = Period::new(3, 2024).unwrap();
        let id = db.upsert_budget(1, "Food", dec!(500), &period).unwrap();
        assert!(db.get_budget(id).unwrap().is_some());
        assert!(db.delete_budget(id).unwrap());
        assert!(db.get_budget(id).unwrap().is_none());
    }

    #[test]
    fn test_goal_lifecycle() {
        let db = Database::in_memory().unwrap();
        let low = db
            .create_goal(&NewGoal {
                owner_id: 1,
                name: "Viagem".into(),
                target_amount: dec!(3000),
                current_amount: dec!(0),
                deadline: Some(date(2024, 12, 1)),
                category: None,
                priority: 2,
            })
            .unwrap();
        let high = db
            .create_goal(&NewGoal {
                owner_id: 1,
                name: "Reserva".into(),
                target_amount: dec!(1000),
                current_amount: dec!(200),
                deadline: None,
                category: Some("Savings".into()),
                priority: 5,
            })
            .unwrap();

        let goals = db.list_goals(1, false).unwrap();
        assert_eq!(
            goals.iter().map(|g| g.id).collect::<Vec<_>>(),
            vec![high, low]
        );

        let done = db.update_goal_progress(high, dec!(1000)).unwrap();
        assert!(done.is_completed());
        assert_eq!(db.list_goals(1, false).unwrap().len(), 1);
        assert_eq!(db.list_goals(1, true).unwrap().len(), 2);

        assert!(db.update_goal_progress(low, dec!(-5)).is_err());
        assert!(matches!(
            db.update_goal_progress(999, dec!(5)),
            Err(Error::NotFound(_))
        ));

        assert!(db.delete_goal(low).unwrap());
        assert!(db.get_goal(low).unwrap().is_none());
    }

    #[test]
    fn test_goal_priority_validated() {
        let db = Database::in_memory().unwrap();
        let result = db.create_goal(&NewGoal {
            owner_id: 1,
            name: "x".into(),
            target_amount: dec!(10),
            current_amount: dec!(0),
            deadline: None,
            category: None,
            priority: 9,
        });
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_encrypted_db_reopens_with_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enc.db");
        let path = path.to_string_lossy();

        {
            let db = Database::new_with_key(&path, Some("segredo")).unwrap();
            db.create_transaction(&expense(1, dec!(5), "Food", date(2024, 3, 1)))
                .unwrap();
        }

        let db = Database::new_with_key(&path, Some("segredo")).unwrap();
        assert_eq!(db.recent_transactions(1, 10).unwrap().len(), 1);

        assert!(Database::new_with_key(&path, Some("errado")).is_err());
    }
}
