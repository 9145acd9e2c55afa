// ABOUTME: Static HTML chat page served on the root path
// ABOUTME: Browser-side counterpart of the envelope protocol, including fetch delegation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! The served chat page. Out of scope beyond being a static asset; the
//! embedded script is the reference client for the envelope protocol,
//! including the browser-side half of fetch delegation.

/// The chat page returned for `GET /`
pub const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <meta charset="utf-8" />
        <title>WebSocket 聊天</title>
        <style>
            .system { color: gray; font-style: italic; }
            .error { color: red; }
            .chat { color: black; }
            .command { color: blue; }
            .response { color: green; }
            .user { font-weight: normal; }
            .agent { font-weight: bold; }
        </style>
    </head>
    <body>
        <h1>WebSocket 聊天</h1>
        <div>
            <label for="username">用户名:</label>
            <input type="text" id="username" value="游客" />
        </div>
        <div>
            <p>可用命令: /help, /clear, /rename &lt;新名字&gt;, /status, /history &lt;数量&gt;, /fetch, /add_fav</p>
        </div>
        <form action="" onsubmit="sendMessage(event)">
            <input type="text" id="messageText" autocomplete="off"/>
            <button>发送</button>
        </form>
        <ul id='messages'>
        </ul>
        <script>
            var ws = new WebSocket("ws://" + location.host + "/ws");

            ws.onmessage = function(event) {
                var data = JSON.parse(event.data);

                // 服务器委托浏览器执行抓取请求
                if (data.type === 'command' && data.command === 'fetch') {
                    performFetch(data.data);
                    return;
                }

                var messages = document.getElementById('messages');
                var message = document.createElement('li');
                message.className = `${data.type} ${data.role}`;
                var time = new Date(data.timestamp).toLocaleTimeString();
                var content = document.createTextNode(`[${time}] ${data.sender}: ${data.content}`);
                message.appendChild(content);
                messages.appendChild(message);

                if (data.type === 'response' && data.content === '聊天记录已清除') {
                    messages.innerHTML = '';
                    messages.appendChild(message);
                }
            };

            function performFetch(request) {
                var options = { method: request.method, headers: request.headers };
                if (request.data) {
                    options.body = typeof request.data === 'string'
                        ? request.data
                        : JSON.stringify(request.data);
                }
                fetch(request.url, options)
                    .then(function(resp) { return resp.text(); })
                    .then(function(body) {
                        ws.send(JSON.stringify({ data: { status: 'ok', body: body } }));
                    })
                    .catch(function(err) {
                        ws.send(JSON.stringify({ data: { status: 'error', error: String(err) } }));
                    });
            }

            function sendMessage(event) {
                var input = document.getElementById("messageText");
                var username = document.getElementById("username");

                if (input.value) {
                    var message = {
                        type: "chat",
                        role: "user",
                        content: input.value,
                        sender: username.value
                    };
                    ws.send(JSON.stringify(message));
                    input.value = '';
                }
                event.preventDefault();
            }
        </script>
    </body>
</html>
"#;
