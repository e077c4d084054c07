use renderer::{CanvasSize, GraphicsContext, ShaderStage, UniformValue};
use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext as GL, WebGlShader, WebGlUniformLocation};

/// `WebGlRenderingContext` as a runtime graphics context. Shaders are
/// GLSL ES 1.00.
#[derive(Clone)]
pub struct WebGlContext {
    gl: GL,
}

impl WebGlContext {
    pub fn new(gl: GL) -> Self {
        Self { gl }
    }

    pub fn raw(&self) -> &GL {
        &self.gl
    }
}

impl GraphicsContext for WebGlContext {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type UniformLocation = WebGlUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        let kind = match stage {
            ShaderStage::Vertex => GL::VERTEX_SHADER,
            ShaderStage::Fragment => GL::FRAGMENT_SHADER,
        };
        self.gl.create_shader(kind)
    }

    fn compile_shader(&self, shader: &WebGlShader, source: &str) -> Result<(), String> {
        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);
        let compiled = self
            .gl
            .get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false);
        if compiled {
            Ok(())
        } else {
            Err(self.gl.get_shader_info_log(shader).unwrap_or_default())
        }
    }

    fn delete_shader(&self, shader: WebGlShader) {
        self.gl.delete_shader(Some(&shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        self.gl.create_program()
    }

    fn link_program(
        &self,
        program: &WebGlProgram,
        vertex: &WebGlShader,
        fragment: &WebGlShader,
    ) -> Result<(), String> {
        self.gl.attach_shader(program, vertex);
        self.gl.attach_shader(program, fragment);
        self.gl.link_program(program);
        let linked = self
            .gl
            .get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if linked {
            Ok(())
        } else {
            Err(self.gl.get_program_info_log(program).unwrap_or_default())
        }
    }

    fn delete_program(&self, program: WebGlProgram) {
        self.gl.delete_program(Some(&program));
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.gl.use_program(Some(program));
    }

    fn create_vertex_buffer(&self, data: &[u8]) -> Option<WebGlBuffer> {
        let buffer = self.gl.create_buffer()?;
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        self.gl
            .buffer_data_with_u8_array(GL::ARRAY_BUFFER, data, GL::STATIC_DRAW);
        Some(buffer)
    }

    fn bind_vertex_attribute(
        &self,
        program: &WebGlProgram,
        buffer: &WebGlBuffer,
        name: &str,
        components: i32,
    ) -> bool {
        let Ok(location) = u32::try_from(self.gl.get_attrib_location(program, name)) else {
            return false;
        };
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.gl.enable_vertex_attrib_array(location);
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
        true
    }

    fn delete_buffer(&self, buffer: WebGlBuffer) {
        self.gl.delete_buffer(Some(&buffer));
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn set_uniform(&self, location: &WebGlUniformLocation, value: UniformValue) {
        match value {
            UniformValue::Float(v) => self.gl.uniform1f(Some(location), v),
            UniformValue::Vec2([x, y]) => self.gl.uniform2f(Some(location), x, y),
            UniformValue::Vec3([x, y, z]) => self.gl.uniform3f(Some(location), x, y, z),
        }
    }

    fn viewport(&self, size: CanvasSize) {
        let width = i32::try_from(size.width).unwrap_or(i32::MAX);
        let height = i32::try_from(size.height).unwrap_or(i32::MAX);
        self.gl.viewport(0, 0, width, height);
    }

    fn draw_triangles(&self, vertex_count: i32) {
        self.gl.draw_arrays(GL::TRIANGLES, 0, vertex_count);
    }
}
