use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use jamo_engine::jamo_core::cache::ResponseCache;
use jamo_engine::{
    ClientIdentity, HttpTransport, OperationKind, PipelineConfig, RequestPipeline, ServiceError,
    Transport,
};

use super::{die, CliError};

pub struct OneShot {
    pub base_url: String,
    pub translate_path: String,
    pub correct_path: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub tier: String,
    pub device_id: String,
}

/// Send `text` once through a pipeline with no debounce and wait for the
/// outcome.
pub fn run_once(
    operation: OperationKind,
    text: &str,
    transport: Arc<dyn Transport>,
    opts: &OneShot,
) -> Result<String, CliError> {
    let config = PipelineConfig {
        debounce: Duration::ZERO,
        max_retries: opts.max_retries,
        identity: ClientIdentity {
            tier: opts.tier.clone(),
            device_id: opts.device_id.clone(),
        },
    };
    let mut pipeline = RequestPipeline::new(operation, config, ResponseCache::new(1), transport);

    let outcome: Rc<RefCell<Option<Result<String, ServiceError>>>> = Rc::default();
    {
        let outcome = Rc::clone(&outcome);
        pipeline.set_on_result(move |c| *outcome.borrow_mut() = Some(Ok(c.output.clone())));
    }
    {
        let outcome = Rc::clone(&outcome);
        pipeline.set_on_error(move |e| *outcome.borrow_mut() = Some(Err(e.clone())));
    }

    pipeline.submit(text);
    let budget = opts.timeout * (opts.max_retries + 1) + Duration::from_secs(1);
    pipeline.run_until_idle(budget);

    let result = outcome.borrow_mut().take();
    match result {
        Some(r) => Ok(r?),
        None => Err(CliError::NoResponse(budget.as_secs())),
    }
}

pub fn http_transport(opts: &OneShot) -> HttpTransport {
    HttpTransport::new(opts.base_url.clone(), opts.timeout)
        .with_paths(&opts.translate_path, &opts.correct_path)
}

fn http(opts: &OneShot) -> Arc<dyn Transport> {
    Arc::new(http_transport(opts))
}

pub fn translate(text: &str, source_lang: &str, target_lang: &str, opts: &OneShot) {
    let op = OperationKind::translate(source_lang, target_lang);
    let output = die!(run_once(op, text, http(opts), opts), "Error: {}");
    println!("{output}");
}

pub fn correct(text: &str, language: &str, tone: &str, opts: &OneShot) {
    let op = OperationKind::correct(language, tone);
    let output = die!(run_once(op, text, http(opts), opts), "Error: {}");
    println!("{output}");
}
