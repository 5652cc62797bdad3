use tokio::sync::mpsc;

use crate::foundation::error::FramemarkResult;
use crate::handshake::protocol::{
    RenderRequest, RenderResponse, ShadowRequest, ShadowResponse, TextRequest, TextResponse,
};
use crate::handshake::{Correlator, HandshakeConfig};

/// Job-side handle to the renderer, shared by every concurrent job.
#[derive(Clone)]
pub struct RendererBus {
    outbound: mpsc::UnboundedSender<RenderRequest>,
    text: Correlator<TextResponse>,
    shadow: Correlator<ShadowResponse>,
    config: HandshakeConfig,
}

/// Renderer-side end: the request stream plus a [`Responder`].
pub struct RendererEndpoint {
    requests: mpsc::UnboundedReceiver<RenderRequest>,
    responder: Responder,
}

/// Delivers renderer answers to the waiting jobs.
#[derive(Clone)]
pub struct Responder {
    text: Correlator<TextResponse>,
    shadow: Correlator<ShadowResponse>,
}

/// Create a connected bus/endpoint pair.
pub fn renderer_channel(config: HandshakeConfig) -> (RendererBus, RendererEndpoint) {
    let (outbound, requests) = mpsc::unbounded_channel();
    let text = Correlator::new();
    let shadow = Correlator::new();
    let bus = RendererBus {
        outbound,
        text: text.clone(),
        shadow: shadow.clone(),
        config,
    };
    let endpoint = RendererEndpoint {
        requests,
        responder: Responder { text, shadow },
    };
    (bus, endpoint)
}

impl RendererBus {
    /// Request the text bitmaps for a job.
    pub async fn request_text(&self, req: TextRequest) -> FramemarkResult<TextResponse> {
        let id = req.id.clone();
        self.text
            .request(
                &self.outbound,
                RenderRequest::GenTextImg(req),
                &id,
                self.config.timeout,
                "text generation",
            )
            .await
    }

    /// Request the shadow mask for a job.
    pub async fn request_shadow(&self, req: ShadowRequest) -> FramemarkResult<ShadowResponse> {
        let id = req.id.clone();
        self.shadow
            .request(
                &self.outbound,
                RenderRequest::GenMainImgShadow(req),
                &id,
                self.config.timeout,
                "shadow generation",
            )
            .await
    }

    /// Requests of either kind still awaiting an answer.
    pub fn pending(&self) -> usize {
        self.text.pending_count() + self.shadow.pending_count()
    }
}

impl RendererEndpoint {
    /// Next request, `None` once every bus clone is gone.
    pub async fn recv(&mut self) -> Option<RenderRequest> {
        self.requests.recv().await
    }

    pub fn responder(&self) -> Responder {
        self.responder.clone()
    }
}

impl Responder {
    pub fn text(&self, resp: TextResponse) -> bool {
        let id = resp.id.clone();
        self.text.resolve(&id, resp)
    }

    pub fn shadow(&self, resp: ShadowResponse) -> bool {
        let id = resp.id.clone();
        self.shadow.resolve(&id, resp)
    }

    /// Route a tagged response to its waiter; `false` when nobody is waiting.
    pub fn respond(&self, resp: RenderResponse) -> bool {
        match resp {
            RenderResponse::GenTextImg(r) => self.text(r),
            RenderResponse::GenMainImgShadow(r) => self.shadow(r),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handshake/bus.rs"]
mod tests;
