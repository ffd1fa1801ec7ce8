//! Images, recognized by their magic bytes.

use anyhow::Result;

use super::extension;
use crate::analyzer::{Reference, ResourceAnalyzer};
use crate::config::PackConfig;
use crate::store::{Dependency, Resource};
use crate::utils::exec::Cmd;
use crate::utils::hash::content_uri;

const SIGNATURES: &[&[u8]] = &[
    b"\x89PNG\r\n\x1a\n",
    b"\xff\xd8\xff",
    b"GIF87a",
    b"GIF89a",
    b"\x00\x00\x01\x00",
];

pub struct Image;

fn is_webp(content: &[u8]) -> bool {
    content.len() >= 12 && &content[..4] == b"RIFF" && &content[8..12] == b"WEBP"
}

fn is_svg(content: &[u8]) -> bool {
    let head = &content[..content.len().min(1024)];
    String::from_utf8_lossy(head).contains("<svg")
}

impl ResourceAnalyzer for Image {
    fn sniff(&self, content: &[u8]) -> bool {
        SIGNATURES.iter().any(|sig| content.starts_with(sig)) || is_webp(content) || is_svg(content)
    }

    fn must_precompress(&self) -> bool {
        false
    }

    fn find_references(&self, _resource: &Resource) -> Result<Vec<Reference>> {
        Ok(Vec::new())
    }

    fn optimize(
        &self,
        resource: &Resource,
        _deps: &[Dependency],
        config: &PackConfig,
    ) -> Result<Vec<u8>> {
        if config.tools.image.is_empty() {
            return Ok(resource.content.clone());
        }
        Ok(Cmd::from_slice(&config.tools.image)
            .stdin(&resource.content)
            .run()?)
    }

    fn output_uri(&self, resource: &Resource, optimized: &[u8], config: &PackConfig) -> String {
        content_uri(&config.output.images, &extension(&resource.path), optimized)
    }
}
