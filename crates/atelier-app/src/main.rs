//! # atelier-app
//!
//! Atelier CLI 바이너리 진입점.
//! 설정 로드, DI 와이어링, 명령 실행.

mod container;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use atelier_core::config::AppConfig;
use atelier_core::config_manager::ConfigManager;
use atelier_sync::{CaptureRequest, CaptureSynchronizer};
use atelier_vision::palette::{self, PaletteOptions};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::container::Overrides;

/// Atelier — 영감 캡처 도구
///
/// 사진을 블러 미리보기와 대표 색상으로 저장하고 원격 저장소와 동기화한다.
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 오프라인 모드로 실행 (원격 동기화 없이 로컬만 사용)
    #[arg(long, short = 'o', global = true)]
    offline: bool,

    /// 원격 저장소 URL 지정
    #[arg(long, short = 's', global = true)]
    server: Option<String>,

    /// 데이터 저장 경로
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 이미지 캡처 저장
    Capture {
        /// 원본 이미지 파일
        image: PathBuf,
        /// 소유 작가 ID
        #[arg(long)]
        owner: String,
        /// 위치
        #[arg(long)]
        location: Option<String>,
        /// 메모
        #[arg(long)]
        memo: Option<String>,
    },
    /// 캡처 목록 (로컬 먼저, 이후 동기화 결과)
    List {
        #[arg(long)]
        owner: String,
    },
    /// 캡처 삭제
    Delete {
        id: String,
        #[arg(long)]
        owner: String,
    },
    /// 메모 설정 (캡처당 한 번)
    Memo {
        id: String,
        #[arg(long)]
        owner: String,
        text: String,
    },
    /// 대표 색상만 추출 (저장하지 않음)
    Palette {
        image: PathBuf,
        /// 색상 수
        #[arg(short = 'k', long, default_value_t = 5)]
        k: usize,
        /// 난수 시드 (재현용)
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// 설정 로드 (파일이 없거나 깨졌으면 기본값)
fn load_config(path: Option<PathBuf>) -> AppConfig {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    match manager {
        Ok(manager) => {
            info!("설정 파일: {}", manager.config_path().display());
            manager.into_config()
        }
        Err(e) => {
            warn!("설정 로드 실패, 기본값 사용: {e}");
            AppConfig::default_config()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 로깅 초기화 (RUST_LOG 우선)
    // `atelier` 접두사가 모든 atelier_* 크레이트를 포함
    let log_filter = format!("atelier={}", args.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Command::Palette { image, k, seed } = &args.command {
        return run_palette(image, *k, *seed).await;
    }

    let mut config = load_config(args.config.clone());
    container::apply_overrides(
        &mut config,
        &Overrides {
            offline: args.offline,
            server: args.server.clone(),
            data_dir: args.data_dir.clone(),
        },
    );

    let sync = container::build_synchronizer(&config).await?;

    match args.command {
        Command::Capture {
            image,
            owner,
            location,
            memo,
        } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("이미지 읽기 실패: {}", image.display()))?;
            let request = CaptureRequest {
                image_bytes: bytes,
                owner_id: owner,
                location,
                memo,
            };
            let outcome = sync
                .save(request)
                .await
                .map_err(|e| anyhow!(render::save_failure_message(&e)))?;
            render::print_save_outcome(&outcome);
        }
        Command::List { owner } => run_list(&sync, owner).await,
        Command::Delete { id, owner } => {
            sync.delete(&id, &owner)
                .await
                .map_err(|e| anyhow!(render::delete_failure_message(&id, &e)))?;
            println!("🗑  삭제됨: {id}");
        }
        Command::Memo { id, owner, text } => {
            let record = sync
                .update_memo(&id, &owner, &text)
                .await
                .context("메모 설정 실패")?;
            println!("📝 {}", render::record_line(&record));
        }
        Command::Palette { .. } => {}
    }

    Ok(())
}

/// 로컬 스냅샷과 최종 스냅샷을 도착 순서대로 출력
async fn run_list(sync: &CaptureSynchronizer, owner: String) {
    let (tx, mut rx) = mpsc::channel(4);

    let producer = async move {
        sync.list_with_updates(&owner, &tx).await;
    };
    let consumer = async {
        while let Some(snapshot) = rx.recv().await {
            render::print_snapshot(&snapshot);
        }
    };

    tokio::join!(producer, consumer);
}

async fn run_palette(image: &Path, k: usize, seed: Option<u64>) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("이미지 읽기 실패: {}", image.display()))?;

    let options = PaletteOptions {
        k,
        ..PaletteOptions::default()
    };
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let colors = tokio::task::spawn_blocking(move || {
        palette::extract_dominant_colors(&bytes, &options, &mut rng)
    })
    .await
    .context("팔레트 태스크 실패")??;

    for hex in palette::to_hex_palette(&colors) {
        println!("{}", render::swatch(&hex));
    }
    Ok(())
}
