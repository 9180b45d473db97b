//! Integration tests for the page file and buffer pool working together.

use pagepool::{
    BufferPool, BufferPoolConfig, PageFile, PageId, PoolError, ReplacementStrategy,
    SharedBufferPool, PAGE_SIZE,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn setup_test_env() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("pages.bin");
    (temp_dir, path)
}

fn stamp(page: u32) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    bytes[..4].copy_from_slice(&page.to_le_bytes());
    bytes[4..].copy_from_slice(b"page");
    bytes
}

// =============================================================================
// Page File Integration Tests
// =============================================================================

mod page_file_integration {
    use super::*;

    #[test]
    fn test_create_open_grow() {
        let (_temp, path) = setup_test_env();
        PageFile::create(&path).expect("create");

        let mut file = PageFile::open(&path).expect("open");
        assert_eq!(file.num_pages(), 1);

        file.ensure_capacity(4).expect("grow");
        assert_eq!(file.num_pages(), 4);

        let mut buf = vec![0u8; PAGE_SIZE];
        buf[0] = 0x5A;
        file.write_page(PageId::new(3), &buf).expect("write");
        file.close().expect("close");

        let mut file = PageFile::open(&path).expect("reopen");
        let mut out = vec![0xFFu8; PAGE_SIZE];
        file.read_page(PageId::new(3), &mut out).expect("read");
        assert_eq!(out[0], 0x5A);
        assert!(out[1..].iter().all(|&b| b == 0));
        assert_eq!(
            std::fs::metadata(&path).expect("metadata").len(),
            4 * PAGE_SIZE as u64
        );
    }

    #[test]
    fn test_destroy_then_open_fails() {
        let (_temp, path) = setup_test_env();
        PageFile::create(&path).expect("create");
        PageFile::destroy(&path).expect("destroy");

        assert!(matches!(
            PageFile::open(&path),
            Err(PoolError::FileNotFound { .. })
        ));
    }
}

// =============================================================================
// Buffer Pool Integration Tests
// =============================================================================

mod buffer_pool_integration {
    use super::*;

    #[test]
    fn test_data_survives_eviction() {
        let (_temp, path) = setup_test_env();
        PageFile::create(&path).expect("create");
        let mut pool = BufferPool::init(&path, 3, ReplacementStrategy::Lru).expect("init");
        pool.ensure_capacity(20).expect("grow");

        for page in 0..20 {
            let handle = pool.pin(PageId::new(page)).expect("pin");
            pool.page_mut(&handle).expect("page")[..8].copy_from_slice(&stamp(page));
            pool.mark_dirty(handle.page_id()).expect("mark dirty");
            pool.unpin(handle.page_id()).expect("unpin");
        }

        // Only three pages fit; seventeen were written back on eviction
        assert_eq!(pool.write_count(), 17);

        for page in (0..20).rev() {
            let handle = pool.pin(PageId::new(page)).expect("pin");
            assert_eq!(pool.page(&handle).expect("page")[..8], stamp(page));
            pool.unpin(handle.page_id()).expect("unpin");
        }
    }

    #[test]
    fn test_persistence_across_shutdown() {
        let (_temp, path) = setup_test_env();
        PageFile::create(&path).expect("create");

        {
            let mut pool = BufferPool::init(&path, 4, ReplacementStrategy::Fifo).expect("init");
            for _ in 0..5 {
                let handle = pool.new_page().expect("new page");
                let page = handle.page_id();
                pool.page_mut(&handle).expect("page")[..8].copy_from_slice(&stamp(page.get()));
                pool.mark_dirty(page).expect("mark dirty");
                pool.unpin(page).expect("unpin");
            }
            pool.shutdown().expect("shutdown");
        }

        let mut pool = BufferPool::init(&path, 2, ReplacementStrategy::Lru).expect("reopen");
        assert_eq!(pool.num_pages_in_file(), 6);
        for page in 1..6 {
            let handle = pool.pin(PageId::new(page)).expect("pin");
            assert_eq!(pool.page(&handle).expect("page")[..8], stamp(page));
            pool.unpin(handle.page_id()).expect("unpin");
        }
        assert_eq!(pool.read_count(), 5);
        pool.shutdown().expect("shutdown");
    }

    #[test]
    fn test_unmarked_change_is_lost_on_eviction() {
        let (_temp, path) = setup_test_env();
        PageFile::create(&path).expect("create");
        let mut pool = BufferPool::init(&path, 1, ReplacementStrategy::Fifo).expect("init");
        pool.ensure_capacity(2).expect("grow");

        let handle = pool.pin(PageId::new(0)).expect("pin");
        pool.page_mut(&handle).expect("page")[0] = 0x77;
        pool.unpin(handle.page_id()).expect("unpin");

        let other = pool.pin(PageId::new(1)).expect("pin");
        pool.unpin(other.page_id()).expect("unpin");

        let handle = pool.pin(PageId::new(0)).expect("pin");
        assert_eq!(pool.page(&handle).expect("page")[0], 0);
        assert_eq!(pool.write_count(), 0);
    }

    #[test]
    fn test_pin_past_end_of_file() {
        let (_temp, path) = setup_test_env();
        PageFile::create(&path).expect("create");
        let mut pool = BufferPool::init(&path, 2, ReplacementStrategy::Fifo).expect("init");

        let err = pool.pin(PageId::new(1)).unwrap_err();
        assert!(matches!(err, PoolError::PageOutOfRange { num_pages: 1, .. }));

        pool.append_empty_page().expect("append");
        pool.pin(PageId::new(1)).expect("pin after grow");
        assert_eq!(pool.stats().resident_pages, 1);
    }

    #[test]
    fn test_stats_match_counters() {
        let (_temp, path) = setup_test_env();
        PageFile::create(&path).expect("create");
        let mut pool = BufferPool::init(&path, 2, ReplacementStrategy::Lru).expect("init");
        pool.ensure_capacity(3).expect("grow");

        for page in [0, 1, 0, 2, 0] {
            let handle = pool.pin(PageId::new(page)).expect("pin");
            pool.unpin(handle.page_id()).expect("unpin");
        }

        let stats = pool.stats();
        assert_eq!(stats.disk_reads, pool.read_count());
        assert_eq!(stats.cache_hits, pool.hit_count());
        assert_eq!(stats.disk_reads, 3);
        assert_eq!(stats.cache_hits, 2);
        let hit_rate = stats.hit_rate().expect("requests were made");
        assert!((hit_rate - 0.4).abs() < f64::EPSILON);
    }
}

// =============================================================================
// Configuration Integration Tests
// =============================================================================

mod config_integration {
    use super::*;

    #[test]
    fn test_open_creates_missing_file() {
        let (_temp, path) = setup_test_env();
        let config = BufferPoolConfig::new(&path)
            .with_num_frames(8)
            .with_strategy(ReplacementStrategy::Lru)
            .with_create_if_missing(true);

        let pool = BufferPool::open(&config).expect("open");
        assert!(path.exists());
        assert_eq!(pool.num_frames(), 8);
        assert_eq!(pool.strategy(), ReplacementStrategy::Lru);
        assert_eq!(pool.num_pages_in_file(), 1);
    }

    #[test]
    fn test_open_without_create_requires_file() {
        let (_temp, path) = setup_test_env();
        let err = BufferPool::open(&BufferPoolConfig::new(&path)).unwrap_err();
        assert!(matches!(err, PoolError::FileNotFound { .. }));
    }

    #[test]
    fn test_open_from_toml_file() {
        let (temp, path) = setup_test_env();
        let config_path = temp.path().join("pool.toml");
        let content = format!(
            "page_file = {:?}\nnum_frames = 5\nstrategy = \"fifo\"\ncreate_if_missing = true\n",
            path.display().to_string()
        );
        std::fs::write(&config_path, content).expect("write config");

        let config = BufferPoolConfig::from_file(&config_path).expect("load config");
        let pool = BufferPool::open(&config).expect("open");
        assert_eq!(pool.num_frames(), 5);
        assert_eq!(pool.strategy(), ReplacementStrategy::Fifo);
        assert_eq!(pool.page_file_path(), path.as_path());
    }
}

// =============================================================================
// Shared Pool Integration Tests
// =============================================================================

mod shared_pool_integration {
    use super::*;

    #[test]
    fn test_shared_pool_writes_visible_after_reopen() {
        let (_temp, path) = setup_test_env();
        let config = BufferPoolConfig::new(&path)
            .with_num_frames(2)
            .with_create_if_missing(true);
        let mut pool = BufferPool::open(&config).expect("open");
        pool.ensure_capacity(6).expect("grow");
        let shared = SharedBufferPool::new(pool);

        let workers: Vec<_> = (0..3u32)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for page in [i * 2, i * 2 + 1] {
                        shared
                            .with_page_mut(PageId::new(page), |bytes| {
                                bytes[..8].copy_from_slice(&stamp(page));
                            })
                            .expect("write page");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("join worker");
        }
        shared.try_shutdown().expect("shutdown");

        let mut pool = BufferPool::open(&config).expect("reopen");
        for page in 0..6 {
            let handle = pool.pin(PageId::new(page)).expect("pin");
            assert_eq!(pool.page(&handle).expect("page")[..8], stamp(page));
            pool.unpin(handle.page_id()).expect("unpin");
        }
    }
}
