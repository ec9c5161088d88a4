// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! OpenGL ES shader programs and their reflection tables.

use super::conversions::IntoGl;
use super::driver::GlDriver;
use ember_core::renderer::{
    AttributeInfo, ResourceError, Shader, ShaderError, ShaderObject, ShaderStage, UniformInfo,
    VertexUsage,
};
use ember_core::utils::NameHash;
use ember_core::Resource;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Reflection {
    attributes: Vec<AttributeInfo>,
    uniforms: Vec<UniformInfo>,
}

/// A native program with up to one attached module per stage.
pub struct GlesShader {
    driver: Rc<dyn GlDriver>,
    label: Option<String>,
    program: u32,
    modules: RefCell<[Option<u32>; 2]>,
    linked: Cell<bool>,
    reflection: RefCell<Reflection>,
}

impl GlesShader {
    pub(super) fn create(
        driver: &Rc<dyn GlDriver>,
        label: Option<&str>,
    ) -> Result<Shader, ResourceError> {
        let program = driver
            .create_program()
            .map_err(ShaderError::ObjectCreationFailed)?;
        Ok(Resource::from_rc(Rc::new(GlesShader {
            driver: Rc::clone(driver),
            label: label.map(str::to_owned),
            program,
            modules: RefCell::new([None; 2]),
            linked: Cell::new(false),
            reflection: RefCell::default(),
        })))
    }

    /// Recovers the concrete shader behind a handle.
    pub(super) fn downcast(shader: &Shader) -> Option<&GlesShader> {
        shader.as_any().downcast_ref()
    }

    /// The native program name.
    pub(super) fn raw(&self) -> u32 {
        self.program
    }

    /// Compiles `source` for `stage` and attaches it in place of the previous module.
    ///
    /// The previous module is detached and released even when compilation
    /// fails, leaving the stage empty.
    pub(super) fn bind_module(&self, stage: ShaderStage, source: &str) -> Result<(), ShaderError> {
        let module = self
            .driver
            .create_shader(stage.into_gl())
            .map_err(ShaderError::ObjectCreationFailed)?;

        let mut modules = self.modules.borrow_mut();
        if let Some(previous) = modules[stage.index()].take() {
            self.driver.detach_shader(self.program, previous);
            self.driver.delete_shader(previous);
        }
        self.linked.set(false);
        *self.reflection.borrow_mut() = Reflection::default();

        if let Err(log) = self.driver.compile_shader(module, source) {
            self.driver.delete_shader(module);
            log::error!(
                "Failed to compile {:?} module of shader '{}':\n{}",
                stage,
                self.display_label(),
                log
            );
            return Err(ShaderError::CompilationFailed {
                label: self.display_label(),
                stage,
                log,
            });
        }

        self.driver.attach_shader(self.program, module);
        modules[stage.index()] = Some(module);
        Ok(())
    }

    /// Links the attached modules and rebuilds the reflection tables.
    /// A no-op when already linked.
    pub(super) fn link(&self) -> Result<(), ShaderError> {
        if self.linked.get() {
            return Ok(());
        }
        if let Some(stage) = ShaderStage::ALL.into_iter().find(|s| !self.has_stage(*s)) {
            return Err(ShaderError::MissingStage {
                label: self.display_label(),
                stage,
            });
        }

        *self.reflection.borrow_mut() = Reflection::default();
        if let Err(log) = self.driver.link_program(self.program) {
            log::error!("Failed to link shader '{}':\n{}", self.display_label(), log);
            return Err(ShaderError::LinkFailed {
                label: self.display_label(),
                log,
            });
        }

        let attributes: Vec<AttributeInfo> = self
            .driver
            .active_attributes(self.program)
            .into_iter()
            .filter(|var| !var.name.starts_with("gl_"))
            .map(|var| AttributeInfo::new(&var.name, var.location))
            .collect();
        let uniforms: Vec<UniformInfo> = self
            .driver
            .active_uniforms(self.program)
            .into_iter()
            .filter(|var| !var.name.starts_with("gl_"))
            .map(|var| UniformInfo::new(&var.name, var.location, var.size))
            .collect();

        for attribute in attributes.iter().filter(|a| a.usage.is_none()) {
            log::debug!(
                "Attribute '{}' of shader '{}' has no known vertex usage",
                attribute.name,
                self.display_label()
            );
        }
        log::debug!(
            "Linked shader '{}': {} attributes, {} uniforms",
            self.display_label(),
            attributes.len(),
            uniforms.len()
        );

        *self.reflection.borrow_mut() = Reflection {
            attributes,
            uniforms,
        };
        self.linked.set(true);
        Ok(())
    }

    /// The reflected slot of the attribute carrying `usage`.
    pub(super) fn attribute_slot(&self, usage: VertexUsage) -> Option<u32> {
        let hash = usage.name_hash();
        self.reflection
            .borrow()
            .attributes
            .iter()
            .find(|a| a.hash == hash)
            .map(|a| a.slot)
    }

    /// The reflected location of the uniform called `name`.
    pub(super) fn uniform_location(&self, name: &str) -> Option<u32> {
        let name = name.strip_suffix("[0]").unwrap_or(name);
        let hash = NameHash::of(name);
        self.reflection
            .borrow()
            .uniforms
            .iter()
            .find(|u| u.hash == hash && u.name == name)
            .map(|u| u.location)
    }

    fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| format!("program {}", self.program))
    }
}

impl ShaderObject for GlesShader {
    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn has_stage(&self, stage: ShaderStage) -> bool {
        self.modules.borrow()[stage.index()].is_some()
    }

    fn is_linked(&self) -> bool {
        self.linked.get()
    }

    fn attributes(&self) -> Vec<AttributeInfo> {
        self.reflection.borrow().attributes.clone()
    }

    fn uniforms(&self) -> Vec<UniformInfo> {
        self.reflection.borrow().uniforms.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for GlesShader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlesShader")
            .field("label", &self.label)
            .field("program", &self.program)
            .field("modules", &*self.modules.borrow())
            .field("linked", &self.linked.get())
            .finish()
    }
}

impl Drop for GlesShader {
    fn drop(&mut self) {
        for module in self.modules.get_mut().iter_mut().filter_map(Option::take) {
            self.driver.detach_shader(self.program, module);
            self.driver.delete_shader(module);
        }
        self.driver.delete_program(self.program);
    }
}
