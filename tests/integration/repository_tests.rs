//! SQLite book repository tests

use book_api::{
    models::{CreateBook, Page, UpdateBook},
    repository::BookRepository,
    AppError,
};
use chrono::NaiveDate;

use crate::common::{file_repository, memory_repository};

fn new_book(title: &str) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        author: "Jane Austen".to_string(),
        published_date: NaiveDate::from_ymd_opt(1813, 1, 28).unwrap(),
        number_of_pages: 432,
    }
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let repository = memory_repository().await;
    let books = &repository.books;

    let created = books.create(&new_book("Pride and Prejudice")).await.unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = books.get(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_missing() {
    let repository = memory_repository().await;

    let result = repository.books.get(404).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_ids_not_reused_after_delete() {
    let repository = memory_repository().await;
    let books = &repository.books;

    let first = books.create(&new_book("Emma")).await.unwrap();
    let second = books.create(&new_book("Persuasion")).await.unwrap();
    books.delete(second.id).await.unwrap();

    let third = books.create(&new_book("Sanditon")).await.unwrap();
    assert!(third.id > second.id);
    assert!(second.id > first.id);

    assert!(matches!(books.get(second.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(books.delete(second.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_update_is_partial_and_advances_timestamp() {
    let repository = memory_repository().await;
    let books = &repository.books;

    let created = books.create(&new_book("Emma")).await.unwrap();

    let first = books
        .update(
            created.id,
            &UpdateBook {
                number_of_pages: Some(500),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.id, created.id);
    assert_eq!(first.title, "Emma");
    assert_eq!(first.author, created.author);
    assert_eq!(first.number_of_pages, 500);
    assert_eq!(first.created_at, created.created_at);
    assert!(first.updated_at > created.updated_at);

    // back to back updates still move forward
    let second = books.update(created.id, &UpdateBook::default()).await.unwrap();
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.number_of_pages, 500);

    let missing = books.update(999, &UpdateBook::default()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_list_orders_and_counts() {
    let repository = memory_repository().await;
    let books = &repository.books;

    for title in ["A", "B", "C", "D", "E"] {
        books.create(&new_book(title)).await.unwrap();
    }
    books.delete(2).await.unwrap();

    let (first_page, total) = books.list(Page::clamped(1, 2)).await.unwrap();
    assert_eq!(total, 4);
    assert_eq!(first_page.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3]);

    let (second_page, _) = books.list(Page::clamped(2, 2)).await.unwrap();
    assert_eq!(second_page.iter().map(|b| b.id).collect::<Vec<_>>(), vec![4, 5]);

    let (beyond, total) = books.list(Page::clamped(3, 2)).await.unwrap();
    assert!(beyond.is_empty());
    assert_eq!(total, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let repository = file_repository(&dir, 8).await;

    let created = repository.books.create(&new_book("Emma")).await.unwrap();
    let id = created.id;

    let mut handles = Vec::new();
    for pages in 1..=32 {
        let books = repository.books.clone();
        handles.push(tokio::spawn(async move {
            books
                .update(
                    id,
                    &UpdateBook {
                        number_of_pages: Some(pages),
                        ..Default::default()
                    },
                )
                .await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().expect("concurrent update failed"));
    }

    // every write landed at its own instant, and the stored row is the latest one
    let mut stamps = results.iter().map(|b| b.updated_at).collect::<Vec<_>>();
    stamps.sort();
    stamps.dedup();
    assert_eq!(stamps.len(), results.len());

    let last = results.iter().max_by_key(|b| b.updated_at).unwrap();
    let stored = repository.books.get(id).await.unwrap();
    assert_eq!(&stored, last);
    assert!(stored.updated_at > created.updated_at);
    assert_eq!(stored.title, "Emma");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_update_of_missing_book_leaves_pool_usable() {
    let dir = tempfile::tempdir().unwrap();
    let repository = file_repository(&dir, 4).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let books = repository.books.clone();
        handles.push(tokio::spawn(async move {
            books.update(77, &UpdateBook::default()).await
        }));
    }
    for handle in handles {
        assert!(matches!(handle.await.unwrap(), Err(AppError::NotFound(_))));
    }

    // rolled back transactions do not hold the write lock
    let created = repository.books.create(&new_book("Lady Susan")).await.unwrap();
    let updated = repository
        .books
        .update(
            created.id,
            &UpdateBook {
                number_of_pages: Some(120),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.number_of_pages, 120);
}
